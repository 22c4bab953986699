//! Retrieve Context use case.
//!
//! Embeds the (history-enhanced) query once, fans the vector out across the
//! configured namespaces, tags every match with its namespace and ranks the
//! combined list.
//!
//! Namespaces that fail are logged and skipped; the turn only sees a
//! retrieval failure when the embedding fails or every namespace fails.

use crate::config::ChatParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::embedding::EmbeddingPort;
use crate::ports::service_error::ServiceError;
use crate::ports::vector_index::VectorIndexPort;
use mana_domain::core::string::preview;
use mana_domain::{ContextSnippet, RetrievalResult, Turn, enhanced_query};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Use case for retrieving ranked context for a query.
#[derive(Clone)]
pub struct RetrieveContextUseCase {
    embedding: Arc<dyn EmbeddingPort>,
    index: Arc<dyn VectorIndexPort>,
    params: ChatParams,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl RetrieveContextUseCase {
    pub fn new(embedding: Arc<dyn EmbeddingPort>, index: Arc<dyn VectorIndexPort>) -> Self {
        Self {
            embedding,
            index,
            params: ChatParams::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_params(mut self, params: ChatParams) -> Self {
        self.params = params;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn params(&self) -> &ChatParams {
        &self.params
    }

    /// Embed the query and collect namespace-tagged snippets, unranked.
    pub async fn retrieve(
        &self,
        query: &str,
        history: &[Turn],
    ) -> Result<Vec<ContextSnippet>, ServiceError> {
        if query.trim().is_empty() {
            return Err(ServiceError::Validation("Query is required".to_string()));
        }

        let start = Instant::now();
        let recent = &history[history.len().saturating_sub(self.params.max_history_turns)..];
        let text = enhanced_query(recent, query);
        debug!(
            "Embedding query ({} history turns): {}",
            recent.len(),
            preview(&text, 80)
        );

        let vector = self.embedding.embed(&text).await?;
        let vector = &vector;

        let queries = self
            .params
            .namespaces
            .iter()
            .map(|q| async move { (q, self.index.query(vector, q).await) });
        let results = futures::future::join_all(queries).await;

        let mut snippets = Vec::new();
        let mut failed = Vec::new();
        let mut last_error = None;
        for (q, result) in results {
            match result {
                Ok(matches) => {
                    debug!(
                        namespace = q.namespace.as_str(),
                        matches = matches.len(),
                        "Namespace query succeeded"
                    );
                    snippets.extend(
                        matches
                            .into_iter()
                            .map(|m| ContextSnippet::from_match(&q.namespace, m)),
                    );
                }
                Err(e) => {
                    warn!(namespace = q.namespace.as_str(), error = %e, "Namespace query failed");
                    failed.push(q.namespace.as_str().to_string());
                    last_error = Some(e);
                }
            }
        }

        let all_failed =
            !self.params.namespaces.is_empty() && failed.len() == self.params.namespaces.len();

        self.conversation_logger.log(ConversationEvent::new(
            "retrieval",
            json!({
                "query": preview(query, 200),
                "history_turns": recent.len(),
                "matches": snippets.len(),
                "failed_namespaces": failed,
                "duration_ms": start.elapsed().as_millis() as u64,
            }),
        ));

        match last_error {
            Some(e) if all_failed => Err(e),
            _ => Ok(snippets),
        }
    }

    /// Retrieve and rank, keeping at most `max_snippets`.
    pub async fn execute(
        &self,
        query: &str,
        history: &[Turn],
    ) -> Result<RetrievalResult, ServiceError> {
        let snippets = self.retrieve(query, history).await?;
        let result = RetrievalResult::aggregate(snippets, self.params.max_snippets);
        info!("Retrieved {} context snippets", result.len());
        Ok(result)
    }
}
