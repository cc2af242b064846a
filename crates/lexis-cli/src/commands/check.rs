use anyhow::Result;
use colored::Colorize;
use lexis_core::Requestor;
use std::path::PathBuf;

use super::load_config;

pub async fn run(config_path: Option<PathBuf>, endpoint: Option<String>) -> Result<()> {
    let (mut config, _) = load_config(config_path)?;
    if let Some(endpoint) = endpoint {
        config.client.endpoint = endpoint;
    }

    let requestor = Requestor::new(&config.client)?;
    let health = requestor.health().await?;

    println!("  {} {}", "Provider:".white(), requestor.endpoint());
    println!("  {} {}", "Model:".white(), health.model.cyan());
    if health.is_ready() {
        println!("  {} {}", "Status:".white(), "ready".green());
    } else {
        println!("  {} {}", "Status:".white(), "unavailable".red());
        if let Some(reason) = &health.reason {
            println!("  {} {}", "Reason:".white(), reason);
        }
        anyhow::bail!("provider at {} cannot serve requests", requestor.endpoint());
    }

    Ok(())
}
