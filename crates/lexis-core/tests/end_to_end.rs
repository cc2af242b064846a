//! Requestor → HTTP router → provider → stub model, over a real socket.

use async_trait::async_trait;
use lexis_core::analysis::ModelInvocation;
use lexis_core::analysis::backend::{ModelBackend, ModelReply};
use lexis_core::config::ClientConfig;
use lexis_core::{AnalysisRequest, CoreError, FilePayload, Provider, Requestor, server};
use std::sync::Arc;
use tokio::net::TcpListener;

struct StubBackend {
    text: Option<String>,
    citations: Vec<String>,
}

#[async_trait]
impl ModelBackend for StubBackend {
    async fn generate(&self, _invocation: &ModelInvocation) -> Result<ModelReply, CoreError> {
        Ok(ModelReply {
            text: self.text.clone(),
            citations: self.citations.clone(),
            input_tokens: 1,
            output_tokens: 1,
        })
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

const BODY_LIMIT: usize = 20 * 1024 * 1024;

async fn start(provider: Provider) -> Requestor {
    start_with_limit(provider, BODY_LIMIT).await
}

async fn start_with_limit(provider: Provider, max_body_bytes: usize) -> Requestor {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve_on(
        listener,
        Arc::new(provider),
        max_body_bytes,
        std::future::pending(),
    ));
    Requestor::new(&ClientConfig {
        endpoint: format!("http://{addr}"),
        timeout_secs: 5,
    })
    .unwrap()
}

fn stub(text: &str, citations: &[&str]) -> Provider {
    Provider::with_backend(Box::new(StubBackend {
        text: Some(text.to_string()),
        citations: citations.iter().map(|c| c.to_string()).collect(),
    }))
}

const RESULT_JSON: &str = r#"{"summary":"s","readabilityScore":55,"sentiment":"negative","suggestions":[],"wordFrequency":[{"word":"rain","count":3}]}"#;

#[tokio::test]
async fn test_grounded_round_trip() {
    let requestor = start(stub(&format!("```json\n{RESULT_JSON}\n```"), &["https://a.x"])).await;
    let result = requestor
        .submit(AnalysisRequest::new("It rained all week.").with_search(true))
        .await
        .unwrap();
    assert_eq!(result.frequency_of("rain"), Some(3));
    assert!(result.fact_check.is_some());
}

#[tokio::test]
async fn test_provider_protocol_error_reaches_requestor_as_server_error() {
    let requestor = start(stub("not json at all", &[])).await;
    let err = requestor
        .submit(AnalysisRequest::new("It rained.").with_search(true))
        .await
        .unwrap_err();
    match err {
        CoreError::Server { status, message } => {
            assert_eq!(status, 502);
            assert!(message.starts_with("failed to parse model output as JSON"), "{message}");
        }
        other => panic!("expected Server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unavailable_provider_returns_503() {
    let requestor = start(Provider::unavailable("gemini-2.5-flash", "no API key")).await;

    let health = requestor.health().await.unwrap();
    assert!(!health.is_ready());
    assert_eq!(health.model, "gemini-2.5-flash");

    let err = requestor
        .submit(AnalysisRequest::new("hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Server { status: 503, ref message } if message.contains("no API key")));
}

#[tokio::test]
async fn test_malformed_body_is_rejected_with_400() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve_on(
        listener,
        Arc::new(stub(RESULT_JSON, &[])),
        BODY_LIMIT,
        std::future::pending(),
    ));

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/analyze"))
        .header("content-type", "application/json")
        .body(r#"{"text": 42}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_ready_health() {
    let requestor = start(stub(RESULT_JSON, &[])).await;
    let health = requestor.health().await.unwrap();
    assert!(health.is_ready());
    assert_eq!(health.model, "stub");
}

#[tokio::test]
async fn test_multi_megabyte_pdf_is_accepted() {
    let requestor = start(stub(RESULT_JSON, &[])).await;
    let pdf = vec![0x25u8; 3 * 1024 * 1024];
    let request = AnalysisRequest::new("").with_file(FilePayload::from_bytes("application/pdf", &pdf));
    let result = requestor.submit(request).await.unwrap();
    assert_eq!(result.frequency_of("rain"), Some(3));
}

#[tokio::test]
async fn test_oversized_body_gets_413_not_validation() {
    let requestor = start_with_limit(stub(RESULT_JSON, &[]), 64 * 1024).await;
    let file = FilePayload::from_bytes("application/pdf", &vec![0u8; 128 * 1024]);
    let err = requestor
        .submit(AnalysisRequest::new("").with_file(file))
        .await
        .unwrap_err();
    match err {
        CoreError::Server { status, message } => {
            assert_eq!(status, 413);
            assert_eq!(message, "request body exceeds 65536 bytes");
        }
        other => panic!("expected Server error, got {other:?}"),
    }
}
