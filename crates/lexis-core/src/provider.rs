use std::collections::BTreeSet;
use tracing::{error, info, warn};

use crate::analysis::backend::{ModelBackend, ModelReply};
use crate::analysis::gemini::GeminiBackend;
use crate::analysis::prompts;
use crate::analysis::ResponseMode;
use crate::config::ModelConfig;
use crate::errors::CoreError;
use crate::models::{AnalysisRequest, AnalysisResult, FactCheck};
use crate::util::{strip_code_fences, truncate_for_error};

/// Note attached to every fact check built from search citations.
pub const FACT_CHECK_NOTE: &str = "sources consulted via web search";

enum ProviderState {
    Ready(Box<dyn ModelBackend>),
    Unavailable { reason: String },
}

/// Turns analysis requests into one model call each and normalizes the answer.
pub struct Provider {
    state: ProviderState,
    model: String,
}

impl Provider {
    /// Build a Gemini-backed provider. A missing API key does not fail here:
    /// the provider comes up unavailable and every request reports why.
    pub fn from_config(config: &ModelConfig) -> Self {
        let Some(api_key) = config.resolve_api_key() else {
            let reason = format!(
                "no API key for the hosted model: set {} or model.api_key in the config",
                config.api_key_env
            );
            warn!(env = %config.api_key_env, "{reason}");
            return Self::unavailable(&config.model, reason);
        };

        match GeminiBackend::new(config, api_key) {
            Ok(backend) => Self::with_backend(Box::new(backend)),
            Err(e) => {
                error!(error = %e, "failed to initialize model backend");
                Self::unavailable(&config.model, e.to_string())
            }
        }
    }

    pub fn with_backend(backend: Box<dyn ModelBackend>) -> Self {
        let model = backend.model_name().to_string();
        Self {
            state: ProviderState::Ready(backend),
            model,
        }
    }

    pub fn unavailable(model: &str, reason: impl Into<String>) -> Self {
        Self {
            state: ProviderState::Unavailable {
                reason: reason.into(),
            },
            model: model.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, ProviderState::Ready(_))
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ProviderState::Ready(_) => None,
            ProviderState::Unavailable { reason } => Some(reason),
        }
    }

    /// Run one analysis: validate, build the invocation, call the model once,
    /// normalize. Failures are returned as-is; nothing is retried.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, CoreError> {
        let backend = match &self.state {
            ProviderState::Ready(backend) => backend,
            ProviderState::Unavailable { reason } => {
                return Err(CoreError::Unavailable(reason.clone()));
            }
        };

        request.validate()?;
        let invocation = prompts::build_invocation(&request);
        info!(
            mode = invocation.mode.label(),
            has_file = request.attached_file().is_some(),
            text_chars = request.text.chars().count(),
            "dispatching analysis"
        );

        let reply = backend.generate(&invocation).await?;
        let result = normalize(&invocation.mode, reply)?;
        info!(
            sentiment = %result.sentiment,
            suggestions = result.suggestions.len(),
            fact_checked = result.fact_check.is_some(),
            "analysis complete"
        );
        Ok(result)
    }
}

/// Normalize a model reply into the stable result shape.
pub fn normalize(mode: &ResponseMode, reply: ModelReply) -> Result<AnalysisResult, CoreError> {
    let text = reply
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CoreError::Provider("no content generated".to_string()))?;

    match mode {
        ResponseMode::Structured { .. } => {
            let mut result = parse_result(text)?;
            result.fact_check = None;
            Ok(result)
        }
        ResponseMode::Grounded => {
            let cleaned = strip_code_fences(text);
            let mut result = parse_result(&cleaned)?;
            result.fact_check = fact_check_from_citations(&reply.citations);
            if result.fact_check.is_none() {
                warn!("search grounding requested but no citations returned; omitting factCheck");
            }
            Ok(result)
        }
    }
}

/// Deduplicate citation URLs into a fact check. `None` when nothing usable remains.
pub fn fact_check_from_citations(citations: &[String]) -> Option<FactCheck> {
    let sources: BTreeSet<String> = citations
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    if sources.is_empty() {
        return None;
    }
    Some(FactCheck {
        verified: true,
        notes: FACT_CHECK_NOTE.to_string(),
        sources,
    })
}

fn parse_result(text: &str) -> Result<AnalysisResult, CoreError> {
    serde_json::from_str(text).map_err(|e| {
        CoreError::Protocol(format!(
            "failed to parse model output as JSON: {e}\nresponse text: {}",
            truncate_for_error(text, 1500)
        ))
    })
}
