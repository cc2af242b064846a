pub mod analysis;
pub mod config;
pub mod errors;
pub mod export;
pub mod models;
pub mod provider;
pub mod requestor;
pub mod server;
pub mod util;

pub use errors::CoreError;
pub use models::{
    AnalysisRequest, AnalysisResult, FactCheck, FilePayload, Sentiment, Suggestion,
    SuggestionType, WordFrequency,
};
pub use provider::Provider;
pub use requestor::Requestor;
