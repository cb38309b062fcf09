use async_trait::async_trait;

use crate::{CompletionRequest, ModelResponse};

/// The completion capability the agent loop consumes.
///
/// One call = one request/response exchange with the underlying model.
/// Implementations own their transport concerns (auth, endpoint selection,
/// internal retries); the loop sees only the final result.  A returned
/// error is fatal to the current run.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Human-readable provider name for status display.
    fn name(&self) -> &str;

    /// Model identifier as reported to users.
    fn model_name(&self) -> &str;

    /// Send a completion request and return the model's full response.
    /// Tool-call ids must be preserved verbatim.
    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<ModelResponse>;
}
