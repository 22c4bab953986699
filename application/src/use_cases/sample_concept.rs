//! Sample Concept use case.
//!
//! Pulls one random entry out of a namespace by querying it with a random
//! unit vector and picking uniformly among the returned neighbours.

use crate::ports::service_error::ServiceError;
use crate::ports::vector_index::VectorIndexPort;
use mana_domain::{ContextSnippet, Namespace, NamespaceQuery};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Neighbours requested per sample.
pub const SAMPLE_TOP_K: usize = 50;

/// Use case for drawing a random concept from the index.
pub struct SampleConceptUseCase {
    index: Arc<dyn VectorIndexPort>,
    rng: Mutex<StdRng>,
}

impl SampleConceptUseCase {
    pub fn new(index: Arc<dyn VectorIndexPort>) -> Self {
        Self {
            index,
            rng: Mutex::new(StdRng::seed_from_u64(rand::random::<u64>())),
        }
    }

    /// Create with a fixed seed for reproducible draws.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Draw one snippet from `namespace`, or `None` if it holds nothing.
    pub async fn execute(
        &self,
        namespace: impl Into<Namespace>,
    ) -> Result<Option<ContextSnippet>, ServiceError> {
        let namespace = namespace.into();
        let vector = self.random_unit_vector(self.index.dimension())?;
        let query = NamespaceQuery::new(namespace.clone(), SAMPLE_TOP_K);

        let matches = self.index.query(&vector, &query).await?;
        debug!(
            namespace = namespace.as_str(),
            matches = matches.len(),
            "Concept sample query returned"
        );
        if matches.is_empty() {
            return Ok(None);
        }

        let pick = self.lock_rng()?.random_range(0..matches.len());
        let snippet = matches
            .into_iter()
            .nth(pick)
            .map(|m| ContextSnippet::from_match(&namespace, m));
        info!("Sampled concept {} from {}", pick, namespace.as_str());
        Ok(snippet)
    }

    fn random_unit_vector(&self, dimension: usize) -> Result<Vec<f32>, ServiceError> {
        if dimension == 0 {
            return Err(ServiceError::Config(
                "Vector index dimension must be positive".to_string(),
            ));
        }
        let mut rng = self.lock_rng()?;
        loop {
            let vector: Vec<f32> = (0..dimension)
                .map(|_| rng.random_range(-1.0f32..=1.0))
                .collect();
            let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
            if norm > f32::EPSILON {
                return Ok(vector.into_iter().map(|v| v / norm).collect());
            }
        }
    }

    fn lock_rng(&self) -> Result<std::sync::MutexGuard<'_, StdRng>, ServiceError> {
        self.rng
            .lock()
            .map_err(|_| ServiceError::Config("random source unavailable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::*;
    use async_trait::async_trait;
    use mana_domain::VectorMatch;

    struct VectorCapture {
        dimension: usize,
        seen: Mutex<Vec<Vec<f32>>>,
    }

    #[async_trait]
    impl VectorIndexPort for VectorCapture {
        async fn query(
            &self,
            vector: &[f32],
            _query: &NamespaceQuery,
        ) -> Result<Vec<VectorMatch>, ServiceError> {
            self.seen.lock().unwrap().push(vector.to_vec());
            Ok(Vec::new())
        }

        fn dimension(&self) -> usize {
            self.dimension
        }
    }

    #[tokio::test]
    async fn test_query_vector_is_unit_length_with_index_dimension() {
        let index = Arc::new(VectorCapture {
            dimension: 1536,
            seen: Mutex::new(Vec::new()),
        });
        let uc = SampleConceptUseCase::new(index.clone()).with_seed(7);

        uc.execute("MANA").await.unwrap();

        let seen = index.seen.lock().unwrap();
        assert_eq!(seen[0].len(), 1536);
        let norm: f32 = seen[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_requests_fifty_neighbours_from_one_namespace() {
        let index = Arc::new(MockIndex::default().with("knowledge", Ok(vec![text_match("a", 0.1)])));
        let uc = SampleConceptUseCase::new(index.clone());

        let snippet = uc.execute("knowledge").await.unwrap().unwrap();

        assert_eq!(snippet.content, "a");
        assert_eq!(snippet.namespace.as_str(), "knowledge");
        assert_eq!(
            *index.calls.lock().unwrap(),
            vec![("knowledge".to_string(), SAMPLE_TOP_K)]
        );
    }

    #[tokio::test]
    async fn test_pick_comes_from_returned_matches() {
        let matches: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|t| text_match(t, 0.5))
            .collect();
        let index = Arc::new(MockIndex::default().with("MANA", Ok(matches)));
        let uc = SampleConceptUseCase::new(index).with_seed(42);

        for _ in 0..10 {
            let snippet = uc.execute("MANA").await.unwrap().unwrap();
            assert!(["a", "b", "c", "d"].contains(&snippet.content.as_str()));
        }
    }

    #[tokio::test]
    async fn test_archive_concept_keeps_id_and_title() {
        let mut m = VectorMatch::new(
            0.4,
            serde_json::json!({
                "text": "the loop",
                "title": "Session 9",
                "full_analysis": {"core_concepts": ["recursion"]}
            })
            .as_object()
            .cloned()
            .unwrap(),
        );
        m.id = Some("br-9".to_string());
        let index = Arc::new(MockIndex::default().with("backrooms", Ok(vec![m])));
        let uc = SampleConceptUseCase::new(index);

        let snippet = uc.execute("backrooms").await.unwrap().unwrap();

        assert_eq!(snippet.metadata["id"], "br-9");
        assert_eq!(snippet.metadata["title"], "Session 9");
        assert_eq!(snippet.metadata["core_concepts"], serde_json::json!(["recursion"]));
    }

    #[tokio::test]
    async fn test_empty_namespace_yields_none() {
        let uc = SampleConceptUseCase::new(Arc::new(MockIndex::default()));
        assert!(uc.execute("backrooms").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_index_error_propagates() {
        let index =
            Arc::new(MockIndex::default().with("MANA", Err(upstream_error("pinecone", 404))));
        let uc = SampleConceptUseCase::new(index);

        let err = uc.execute("MANA").await.unwrap_err();
        assert!(matches!(err, ServiceError::UpstreamStatus { status: 404, .. }));
    }
}
