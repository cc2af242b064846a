//! HTTP client for a running lexis provider.

use std::time::Duration;
use tracing::info;

use crate::config::ClientConfig;
use crate::errors::CoreError;
use crate::models::{AnalysisRequest, AnalysisResult, ErrorBody, HealthStatus};
use crate::util::truncate_for_error;

pub const ANALYZE_PATH: &str = "/api/analyze";
pub const HEALTH_PATH: &str = "/health";

/// Submits analysis requests to a provider's `/api/analyze` endpoint.
pub struct Requestor {
    client: reqwest::Client,
    endpoint: String,
}

impl Requestor {
    /// `endpoint` should be like `http://127.0.0.1:8787`; a trailing slash is trimmed.
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Config(format!("building HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit one request. Empty requests are rejected before anything is sent.
    /// Exactly one attempt is made.
    pub async fn submit(&self, request: AnalysisRequest) -> Result<AnalysisResult, CoreError> {
        request.validate()?;

        let url = format!("{}{ANALYZE_PATH}", self.endpoint);
        info!(
            url = %url,
            search = request.enable_search,
            has_file = request.attached_file().is_some(),
            "submitting analysis"
        );
        let resp = self.client.post(&url).json(&request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(server_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            CoreError::Protocol(format!(
                "response is not an analysis result: {e}\nbody: {}",
                truncate_for_error(&body, 500)
            ))
        })
    }

    /// Ask the provider whether it can serve requests.
    /// A 503 still carries a health body, so only transport failures are errors.
    pub async fn health(&self) -> Result<HealthStatus, CoreError> {
        let url = format!("{}{HEALTH_PATH}", self.endpoint);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|_| server_error(status.as_u16(), &body))
    }
}

/// Build a `Server` error from a non-success response, preferring the body's message.
pub fn server_error(status: u16, body: &str) -> CoreError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("server error, status={status}"));
    CoreError::Server { status, message }
}
