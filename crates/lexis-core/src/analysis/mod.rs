pub mod backend;
pub mod gemini;
pub mod prompts;

use serde_json::{Value, json};

/// How the model is told to shape its answer. The two modes cannot be mixed:
/// the hosted platform rejects a response schema combined with a search tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseMode {
    /// Platform-enforced JSON schema, no tools.
    Structured { schema: Value },
    /// Web search attached; the JSON shape is only described in the prompt.
    Grounded,
}

impl ResponseMode {
    pub fn for_search(enable_search: bool) -> Self {
        if enable_search {
            ResponseMode::Grounded
        } else {
            ResponseMode::Structured {
                schema: analysis_response_schema(),
            }
        }
    }

    pub fn uses_search(&self) -> bool {
        matches!(self, ResponseMode::Grounded)
    }

    pub fn schema(&self) -> Option<&Value> {
        match self {
            ResponseMode::Structured { schema } => Some(schema),
            ResponseMode::Grounded => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResponseMode::Structured { .. } => "structured",
            ResponseMode::Grounded => "grounded",
        }
    }
}

/// One piece of the user turn sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSegment {
    /// Base64 file bytes with their media type.
    Inline { mime_type: String, data: String },
    Text(String),
}

/// Everything needed for a single generate call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInvocation {
    pub system_instruction: String,
    pub segments: Vec<ContentSegment>,
    pub mode: ResponseMode,
}

/// Output schema for schema-constrained generation.
/// Uses the OpenAPI subset accepted by `generationConfig.responseSchema`.
pub fn analysis_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {"type": "STRING"},
            "readabilityScore": {
                "type": "NUMBER",
                "description": "0 (very difficult) to 100 (very easy)"
            },
            "sentiment": {
                "type": "STRING",
                "enum": ["positive", "neutral", "negative"]
            },
            "suggestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "original": {"type": "STRING"},
                        "improvement": {"type": "STRING"},
                        "reason": {"type": "STRING"},
                        "type": {
                            "type": "STRING",
                            "enum": ["grammar", "clarity", "style"]
                        }
                    },
                    "required": ["original", "improvement", "reason", "type"]
                }
            },
            "wordFrequency": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "word": {"type": "STRING"},
                        "count": {"type": "INTEGER"}
                    },
                    "required": ["word", "count"]
                }
            }
        },
        "required": ["summary", "readabilityScore", "sentiment", "suggestions", "wordFrequency"]
    })
}
