use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Model API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Request too large: body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl CoreError {
    /// Short machine-readable name, sent as `kind` in transport error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Network(_) => "network",
            Self::Server { .. } => "server",
            Self::Protocol(_) => "protocol",
            Self::Provider(_) => "provider",
            Self::Upstream { .. } => "upstream",
            Self::Unavailable(_) => "unavailable",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }

    /// The message without its category prefix; `kind()` carries the category.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(m)
            | Self::Network(m)
            | Self::Protocol(m)
            | Self::Provider(m)
            | Self::Unavailable(m)
            | Self::Config(m)
            | Self::Io(m) => m.clone(),
            Self::Server { message, .. } | Self::Upstream { message, .. } => message.clone(),
            Self::PayloadTooLarge { limit } => format!("request body exceeds {limit} bytes"),
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CoreError::Network(format!("request timed out: {e}"))
        } else {
            CoreError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Io(e.to_string())
    }
}
