//! OpenAI embeddings adapter

use super::credentials::require_api_key;
use super::http::{client_with_timeout, join_url, json, send};
use async_trait::async_trait;
use mana_application::{EmbeddingPort, ServiceError};
use mana_domain::OpenAiProviderConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "openai";

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// [`EmbeddingPort`] backed by the OpenAI `/v1/embeddings` endpoint.
pub struct OpenAiEmbeddingAdapter {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiEmbeddingAdapter {
    pub fn new(config: OpenAiProviderConfig, timeout: Duration) -> Self {
        Self {
            client: client_with_timeout(timeout),
            config,
        }
    }
}

#[async_trait]
impl EmbeddingPort for OpenAiEmbeddingAdapter {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        let api_key = require_api_key(
            self.config.api_key.as_deref(),
            &self.config.api_key_env,
            "OpenAI",
        )?;
        debug!(
            model = %self.config.embedding_model,
            chars = text.len(),
            "Requesting embedding"
        );

        let request = self
            .client
            .post(join_url(&self.config.base_url, "/v1/embeddings"))
            .bearer_auth(api_key)
            .json(&EmbeddingRequest {
                model: &self.config.embedding_model,
                input: text,
            });
        let response: EmbeddingResponse = json(SERVICE, send(SERVICE, request).await?).await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ServiceError::MalformedResponse {
                service: SERVICE,
                reason: "no embedding in response".to_string(),
            })
    }
}
