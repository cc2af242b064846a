use crate::errors::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Where `lexis serve` listens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Largest accepted request body. Inline files travel base64-encoded inside it.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Hosted model settings used by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Inline key; the environment variable wins when both are set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

/// Settings for the requestor talking to a running provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_client_timeout")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            api_key: None,
            timeout_secs: default_model_timeout(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_client_timeout(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}
fn default_max_body_bytes() -> usize {
    20 * 1024 * 1024
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_model_timeout() -> u64 {
    120
}
fn default_endpoint() -> String {
    "http://127.0.0.1:8787".to_string()
}
fn default_client_timeout() -> u64 {
    180
}

impl ModelConfig {
    /// Resolve the API key: environment variable first, then the inline value.
    /// Blank values count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        let usable = |k: &str| {
            let k = k.trim();
            (!k.is_empty()).then(|| k.to_string())
        };
        std::env::var(&self.api_key_env)
            .ok()
            .and_then(|k| usable(&k))
            .or_else(|| self.api_key.as_deref().and_then(usable))
    }
}

impl Config {
    /// Load config from the given path, or return defaults if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| CoreError::Io(format!("reading config: {e}")))?;
            let config: Config =
                toml::from_str(&contents).map_err(|e| CoreError::Config(e.to_string()))?;

            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Write config to the given path.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::Io(format!("creating config dir: {e}")))?;
        }
        std::fs::write(path, contents)
            .map_err(|e| CoreError::Io(format!("writing config: {e}")))?;
        Ok(())
    }
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the lexis data directory (~/.lexis/).
pub fn lexis_dir() -> PathBuf {
    home_dir().join(".lexis")
}

/// Default config file location.
pub fn default_config_path() -> PathBuf {
    lexis_dir().join("config.toml")
}

/// Resolve a leading `~` component against $HOME. Config paths given through
/// `LEXIS_CONFIG` never pass through a shell.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home_dir(),
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}
