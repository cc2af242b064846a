use anyhow::Result;
use colored::Colorize;
use lexis_core::config::Config;
use std::path::PathBuf;

use super::load_config;

pub fn run(config_path: Option<PathBuf>) -> Result<()> {
    let (_, path) = load_config(config_path)?;

    if path.exists() {
        println!("  {} {}", "Exists".yellow(), path.display());
    } else {
        Config::default().save(&path)?;
        println!("  {} {}", "Created".green(), path.display());
    }

    let model = Config::load(&path)?.model;
    match model.resolve_api_key() {
        Some(_) => println!(
            "  {} API key found in {}",
            "Ready".green(),
            model.api_key_env
        ),
        None => println!(
            "  {} no API key: export {} before running `lexis serve`",
            "Note".yellow(),
            model.api_key_env
        ),
    }

    Ok(())
}
