//! Google Gemini `generateContent` backend.
//!
//! Request and response structs mirror the REST JSON format. Only the fields
//! lexis reads or writes are modelled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::backend::{ModelBackend, ModelReply};
use super::{ContentSegment, ModelInvocation, ResponseMode};
use crate::config::ModelConfig;
use crate::errors::CoreError;
use crate::util::truncate_for_error;

// ── Request types ──

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: SystemInstruction,
    pub contents: Vec<RequestContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct SystemInstruction {
    pub parts: Vec<RequestPart>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct RequestContent {
    pub role: String,
    pub parts: Vec<RequestPart>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum RequestPart {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub google_search: GoogleSearch,
}

#[derive(Serialize, Debug, Default, PartialEq)]
pub struct GoogleSearch {}

// ── Response types ──

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize, Debug)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Deserialize, Debug)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize, Debug)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebSource>,
}

#[derive(Deserialize, Debug)]
pub struct WebSource {
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
}

/// Google API error envelope: `{"error": {"code": 400, "message": "...", "status": "..."}}`.
#[derive(Deserialize, Debug)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    #[serde(default)]
    message: String,
}

// ── Backend ──

/// Backend calling the Gemini REST API with an API key.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(config: &ModelConfig, api_key: String) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Config(format!("building HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn generate(&self, invocation: &ModelInvocation) -> Result<ModelReply, CoreError> {
        let body = build_request_body(invocation);
        let url = self.endpoint();
        debug!(
            url = %url,
            mode = invocation.mode.label(),
            segments = invocation.segments.len(),
            "calling generateContent"
        );

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|env| env.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| truncate_for_error(&text, 500).to_string());
            return Err(CoreError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let response: GenerateContentResponse = serde_json::from_str(&text).map_err(|e| {
            CoreError::Protocol(format!(
                "failed to parse generateContent response: {e}\nraw output: {}",
                truncate_for_error(&text, 500)
            ))
        })?;

        let reply = parse_reply(response)?;
        info!(
            model = %self.model,
            tokens_in = reply.input_tokens,
            tokens_out = reply.output_tokens,
            citations = reply.citations.len(),
            "model call complete"
        );
        Ok(reply)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Translate an invocation into the REST request body.
/// The schema and the search tool come from the same `ResponseMode`, so a body
/// never carries both.
pub fn build_request_body(invocation: &ModelInvocation) -> GenerateContentRequest {
    let parts = invocation
        .segments
        .iter()
        .map(|segment| match segment {
            ContentSegment::Inline { mime_type, data } => RequestPart::Inline {
                inline_data: InlineData {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                },
            },
            ContentSegment::Text(text) => RequestPart::Text { text: text.clone() },
        })
        .collect();

    let (generation_config, tools) = match &invocation.mode {
        ResponseMode::Structured { schema } => (
            Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema.clone(),
            }),
            None,
        ),
        ResponseMode::Grounded => (
            None,
            Some(vec![Tool {
                google_search: GoogleSearch::default(),
            }]),
        ),
    };

    GenerateContentRequest {
        system_instruction: SystemInstruction {
            parts: vec![RequestPart::Text {
                text: invocation.system_instruction.clone(),
            }],
        },
        contents: vec![RequestContent {
            role: "user".to_string(),
            parts,
        }],
        generation_config,
        tools,
    }
}

/// Pull text, citations and token counts out of a decoded response.
pub fn parse_reply(response: GenerateContentResponse) -> Result<ModelReply, CoreError> {
    let (input_tokens, output_tokens) = response
        .usage_metadata
        .as_ref()
        .map(|u| (u.prompt_token_count, u.candidates_token_count))
        .unwrap_or((0, 0));

    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(CoreError::Provider(format!("prompt blocked: {reason}")));
        }
        return Ok(ModelReply {
            text: None,
            citations: Vec::new(),
            input_tokens,
            output_tokens,
        });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        debug!(finish_reason = ?candidate.finish_reason, "candidate carried no text");
    }

    let citations = candidate
        .grounding_metadata
        .map(|g| {
            g.grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web.and_then(|w| w.uri))
                .collect()
        })
        .unwrap_or_default();

    Ok(ModelReply {
        text: Some(text).filter(|t| !t.is_empty()),
        citations,
        input_tokens,
        output_tokens,
    })
}
