use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::errors::CoreError;

// ── Request types ──

/// A single analysis request, as sent from the requestor to the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "fileData", skip_serializing_if = "Option::is_none")]
    pub file: Option<FilePayload>,
    #[serde(default)]
    pub enable_search: bool,
}

/// File contents shipped alongside (or instead of) free text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilePayload {
    pub mime_type: String,
    /// Standard base64 of the raw file bytes.
    pub data: String,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            file: None,
            enable_search: false,
        }
    }

    pub fn with_file(mut self, file: FilePayload) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_search(mut self, enable: bool) -> Self {
        self.enable_search = enable;
        self
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// The attached file, if it carries any data.
    pub fn attached_file(&self) -> Option<&FilePayload> {
        self.file.as_ref().filter(|f| !f.data.is_empty())
    }

    /// Reject requests that carry nothing to analyze or a malformed file payload.
    pub fn validate(&self) -> Result<(), CoreError> {
        let file = self.attached_file();
        if !self.has_text() && file.is_none() {
            return Err(CoreError::Validation(
                "enter text or attach a file to analyze".to_string(),
            ));
        }
        if let Some(file) = file {
            if file.mime_type.trim().is_empty() {
                return Err(CoreError::Validation(
                    "file payload is missing a media type".to_string(),
                ));
            }
            if BASE64.decode(file.data.as_bytes()).is_err() {
                return Err(CoreError::Validation(
                    "file payload is not valid base64".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl FilePayload {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Read a file from disk, guessing its media type from the extension.
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let bytes = std::fs::read(path)
            .map_err(|e| CoreError::Io(format!("reading {}: {e}", path.display())))?;
        Ok(Self::from_bytes(guess_mime_type(path), &bytes))
    }
}

/// Media type for a file path. Unknown extensions are sent as plain text.
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "md" | "markdown" => "text/markdown",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "csv" => "text/csv",
        _ => "text/plain",
    }
}

// ── Result types ──

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Neutral => write!(f, "neutral"),
            Self::Negative => write!(f, "negative"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    Grammar,
    Clarity,
    Style,
}

impl std::fmt::Display for SuggestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grammar => write!(f, "grammar"),
            Self::Clarity => write!(f, "clarity"),
            Self::Style => write!(f, "style"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub original: String,
    pub improvement: String,
    pub reason: String,
    #[serde(rename = "type")]
    pub kind: SuggestionType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordFrequency {
    pub word: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactCheck {
    pub verified: bool,
    pub notes: String,
    /// Deduplicated source URLs; order carries no meaning.
    pub sources: BTreeSet<String>,
}

/// Normalized analysis, identical in shape for both response modes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    /// Nominally 0 (hard) to 100 (easy). Not clamped.
    pub readability_score: f64,
    pub sentiment: Sentiment,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    /// Salient terms; not guaranteed to be sorted.
    #[serde(default)]
    pub word_frequency: Vec<WordFrequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact_check: Option<FactCheck>,
}

impl AnalysisResult {
    pub fn frequency_of(&self, word: &str) -> Option<u32> {
        self.word_frequency
            .iter()
            .find(|w| w.word.eq_ignore_ascii_case(word))
            .map(|w| w.count)
    }
}

// ── Transport types ──

/// Body of a non-success transport response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ErrorBody {
    pub fn from_error(err: &CoreError) -> Self {
        Self {
            error: err.message(),
            kind: Some(err.kind().to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl HealthStatus {
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
