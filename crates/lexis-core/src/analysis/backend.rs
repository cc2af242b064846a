use async_trait::async_trait;

use super::ModelInvocation;
use crate::errors::CoreError;

/// Response from a hosted model call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    /// Generated text, `None` when the model produced nothing.
    pub text: Option<String>,
    /// Source URLs cited by search grounding, as returned (may repeat).
    pub citations: Vec<String>,
    /// Input tokens consumed.
    pub input_tokens: u64,
    /// Output tokens produced.
    pub output_tokens: u64,
}

/// Trait for hosted model backends.
/// One call per invocation; implementations must not retry.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(&self, invocation: &ModelInvocation) -> Result<ModelReply, CoreError>;

    fn model_name(&self) -> &str;
}
