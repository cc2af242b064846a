//! HTTP transport for the provider.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::{AnalysisRequest, ErrorBody, HealthStatus};
use crate::provider::Provider;
use crate::requestor::{ANALYZE_PATH, HEALTH_PATH};

#[derive(Clone)]
struct AppState {
    provider: Arc<Provider>,
    max_body_bytes: usize,
}

/// Routes for the provider. Bodies over `max_body_bytes` are answered with 413.
pub fn router(provider: Arc<Provider>, max_body_bytes: usize) -> Router {
    Router::new()
        .route(ANALYZE_PATH, post(analyze))
        .route(HEALTH_PATH, get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState {
            provider,
            max_body_bytes,
        })
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(
    addr: &str,
    provider: Arc<Provider>,
    max_body_bytes: usize,
) -> Result<(), CoreError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| CoreError::Io(format!("binding {addr}: {e}")))?;
    serve_on(listener, provider, max_body_bytes, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    })
    .await
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve_on<F>(
    listener: TcpListener,
    provider: Arc<Provider>,
    max_body_bytes: usize,
    shutdown: F,
) -> Result<(), CoreError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| CoreError::Io(format!("reading listener address: {e}")))?;
    info!(
        addr = %addr,
        model = provider.model_name(),
        available = provider.is_available(),
        max_body_bytes,
        "provider listening"
    );
    axum::serve(listener, router(provider, max_body_bytes))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CoreError::Io(format!("server error: {e}")))
}

/// HTTP status for each failure kind.
pub fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        CoreError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        CoreError::Network(_)
        | CoreError::Protocol(_)
        | CoreError::Provider(_)
        | CoreError::Upstream { .. }
        | CoreError::Server { .. } => StatusCode::BAD_GATEWAY,
        CoreError::Config(_) | CoreError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &CoreError) -> Response {
    (status_for(err), Json(ErrorBody::from_error(err))).into_response()
}

fn rejection_error(rejection: &JsonRejection, max_body_bytes: usize) -> CoreError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        CoreError::PayloadTooLarge {
            limit: max_body_bytes,
        }
    } else {
        CoreError::Validation(format!("invalid request body: {}", rejection.body_text()))
    }
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Response {
    let provider = state.provider;
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            let err = rejection_error(&rejection, state.max_body_bytes);
            warn!(kind = err.kind(), error = %err, "request body rejected");
            return error_response(&err);
        }
    };

    let request_id = Uuid::new_v4();
    let span = info_span!("analyze", %request_id, search = request.enable_search);
    match provider.analyze(request).instrument(span).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            warn!(%request_id, kind = e.kind(), error = %e, "analysis failed");
            error_response(&e)
        }
    }
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let provider = &state.provider;
    match provider.unavailable_reason() {
        None => (
            StatusCode::OK,
            Json(HealthStatus {
                status: "ready".to_string(),
                model: provider.model_name().to_string(),
                reason: None,
            }),
        ),
        Some(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus {
                status: "unavailable".to_string(),
                model: provider.model_name().to_string(),
                reason: Some(reason.to_string()),
            }),
        ),
    }
}
