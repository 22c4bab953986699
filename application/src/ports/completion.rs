//! Language-model completion port

use super::service_error::ServiceError;
use async_trait::async_trait;

/// Single-shot completion: one user prompt plus a system directive.
///
/// Implementations make exactly one attempt per call. An empty or missing
/// generated text is reported as [`ServiceError::EmptyCompletion`].
#[async_trait]
pub trait CompletionPort: Send + Sync {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, ServiceError>;
}
