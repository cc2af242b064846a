pub mod analyze;
pub mod check;
pub mod init;
pub mod serve;

use anyhow::{Context, Result};
use lexis_core::config::{Config, default_config_path, expand_home};
use std::path::PathBuf;

/// Resolve the config path (flag/env or ~/.lexis/config.toml) and load it.
/// A missing file yields defaults.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path
        .map(|p| expand_home(&p))
        .unwrap_or_else(default_config_path);
    let config = Config::load(&path).with_context(|| format!("loading {}", path.display()))?;
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, path) = load_config(Some(dir.path().join("config.toml"))).unwrap();
        assert_eq!(path, dir.path().join("config.toml"));
        assert_eq!(config.server.bind, "127.0.0.1:8787");
    }

    #[test]
    fn test_load_config_expands_home() {
        let given = PathBuf::from("~/.lexis-absent-for-test/config.toml");
        let (_, path) = load_config(Some(given.clone())).unwrap();
        assert!(!path.starts_with("~"));
        assert_eq!(path, expand_home(&given));
    }
}
