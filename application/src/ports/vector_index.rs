//! Vector index port

use super::service_error::ServiceError;
use async_trait::async_trait;
use mana_domain::{NamespaceQuery, VectorMatch};

/// Nearest-neighbour lookup within one namespace of a vector index.
#[async_trait]
pub trait VectorIndexPort: Send + Sync {
    /// Return up to `query.top_k` matches with metadata attached.
    async fn query(
        &self,
        vector: &[f32],
        query: &NamespaceQuery,
    ) -> Result<Vec<VectorMatch>, ServiceError>;

    /// Dimension of the vectors stored in the index.
    fn dimension(&self) -> usize;
}
