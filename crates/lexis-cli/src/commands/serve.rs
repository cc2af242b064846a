use anyhow::{Context, Result};
use lexis_core::Provider;
use lexis_core::server;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::load_config;

pub async fn run(config_path: Option<PathBuf>, bind: Option<String>) -> Result<()> {
    let (config, path) = load_config(config_path)?;
    info!(config = %path.display(), "starting lexis provider v{}", env!("CARGO_PKG_VERSION"));

    let provider = Provider::from_config(&config.model);
    if let Some(reason) = provider.unavailable_reason() {
        warn!("serving in unavailable mode: {reason}");
    }

    let addr = bind.unwrap_or(config.server.bind);
    server::serve(&addr, Arc::new(provider), config.server.max_body_bytes)
        .await
        .with_context(|| format!("serving on {addr}"))
}
