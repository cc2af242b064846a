use std::path::Path;

use crate::errors::CoreError;
use crate::models::AnalysisResult;

/// File name used when no report path is given.
pub const DEFAULT_REPORT_NAME: &str = "analysis_report.json";

/// Serialize a result as the downloadable report: pretty JSON, 2-space indent.
pub fn to_report_json(result: &AnalysisResult) -> Result<String, CoreError> {
    serde_json::to_string_pretty(result)
        .map_err(|e| CoreError::Protocol(format!("serializing report: {e}")))
}

pub fn from_report_json(json: &str) -> Result<AnalysisResult, CoreError> {
    serde_json::from_str(json).map_err(|e| CoreError::Protocol(format!("parsing report: {e}")))
}

/// Write the report to `path`, creating parent directories as needed.
pub fn write_report(path: &Path, result: &AnalysisResult) -> Result<(), CoreError> {
    let contents = to_report_json(result)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| CoreError::Io(format!("creating report dir: {e}")))?;
    }
    std::fs::write(path, contents)
        .map_err(|e| CoreError::Io(format!("writing report {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FactCheck, Sentiment, Suggestion, SuggestionType, WordFrequency};

    fn grounded_result() -> AnalysisResult {
        AnalysisResult {
            summary: "Claims about boiling points.".to_string(),
            readability_score: -3.5,
            sentiment: Sentiment::Positive,
            suggestions: vec![Suggestion {
                original: "Water boil at 100C.".to_string(),
                improvement: "Water boils at 100C.".to_string(),
                reason: "Subject-verb agreement".to_string(),
                kind: SuggestionType::Grammar,
            }],
            word_frequency: vec![WordFrequency {
                word: "water".to_string(),
                count: 2,
            }],
            fact_check: Some(FactCheck {
                verified: true,
                notes: "sources consulted via web search".to_string(),
                sources: ["https://b.x", "https://a.x"].iter().map(|s| s.to_string()).collect(),
            }),
        }
    }

    #[test]
    fn test_report_round_trip() {
        let result = grounded_result();
        let json = to_report_json(&result).unwrap();
        assert_eq!(from_report_json(&json).unwrap(), result);
    }

    #[test]
    fn test_report_uses_two_space_indent() {
        let json = to_report_json(&grounded_result()).unwrap();
        assert!(json.starts_with("{\n  \"summary\""));
        assert!(json.contains("\n  \"factCheck\": {\n    \"verified\": true"));
    }

    #[test]
    fn test_write_report_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(DEFAULT_REPORT_NAME);
        write_report(&path, &grounded_result()).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(from_report_json(&contents).unwrap(), grounded_result());
    }
}
