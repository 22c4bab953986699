//! Embedding service port

use super::service_error::ServiceError;
use async_trait::async_trait;

/// Turns text into a dense vector.
#[async_trait]
pub trait EmbeddingPort: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError>;
}
