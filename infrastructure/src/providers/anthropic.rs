//! Anthropic Messages API adapter

use super::credentials::require_api_key;
use super::http::{client_with_timeout, join_url, json, send};
use async_trait::async_trait;
use mana_application::{CompletionPort, ServiceError};
use mana_domain::AnthropicProviderConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "anthropic";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [RequestMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// [`CompletionPort`] backed by `POST /v1/messages`.
pub struct AnthropicCompletionAdapter {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicCompletionAdapter {
    pub fn new(config: AnthropicProviderConfig, timeout: Duration) -> Self {
        Self {
            client: client_with_timeout(timeout),
            config,
        }
    }
}

#[async_trait]
impl CompletionPort for AnthropicCompletionAdapter {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, ServiceError> {
        let api_key = require_api_key(
            self.config.api_key.as_deref(),
            &self.config.api_key_env,
            "Anthropic",
        )?;

        let request = self
            .client
            .post(join_url(&self.config.base_url, "/v1/messages"))
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&MessagesRequest {
                model: &self.config.model,
                max_tokens: self.config.max_tokens,
                system,
                messages: [RequestMessage {
                    role: "user",
                    content: prompt,
                }],
            });
        let response: MessagesResponse = json(SERVICE, send(SERVICE, request).await?).await?;
        debug!(
            model = %self.config.model,
            blocks = response.content.len(),
            stop_reason = response.stop_reason.as_deref().unwrap_or("none"),
            "Completion returned"
        );

        let text: String = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        if text.trim().is_empty() {
            return Err(ServiceError::EmptyCompletion { service: SERVICE });
        }
        Ok(text)
    }
}
