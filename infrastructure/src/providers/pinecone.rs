//! Pinecone vector index adapter
//!
//! Queries go straight to the index data-plane host. When no host is
//! configured, it is looked up once from the control plane by index name and
//! cached for the life of the adapter.

use super::credentials::{require_api_key, resolve};
use super::http::{client_with_timeout, join_url, json, send};
use async_trait::async_trait;
use mana_application::{ServiceError, VectorIndexPort};
use mana_domain::{NamespaceQuery, PineconeProviderConfig, VectorMatch};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

const SERVICE: &str = "pinecone";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

/// [`VectorIndexPort`] backed by a Pinecone serverless or pod index.
pub struct PineconeIndexAdapter {
    client: Client,
    config: PineconeProviderConfig,
    host: OnceCell<String>,
}

impl PineconeIndexAdapter {
    pub fn new(config: PineconeProviderConfig, timeout: Duration) -> Self {
        Self {
            client: client_with_timeout(timeout),
            config,
            host: OnceCell::new(),
        }
    }

    fn authed(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request
            .header("Api-Key", api_key)
            .header("X-Pinecone-API-Version", &self.config.api_version)
    }

    async fn host(&self, api_key: &str) -> Result<&str, ServiceError> {
        self.host
            .get_or_try_init(|| async {
                if let Some(host) =
                    resolve(self.config.host.as_deref(), &self.config.host_env)
                {
                    return Ok(normalize_host(&host));
                }
                let index = resolve(self.config.index.as_deref(), &self.config.index_env)
                    .ok_or_else(|| {
                        ServiceError::Config("Pinecone index not configured".to_string())
                    })?;
                let host = self.describe_index(&index, api_key).await?;
                info!(index = %index, host = %host, "Resolved Pinecone index host");
                Ok(host)
            })
            .await
            .map(String::as_str)
    }

    async fn describe_index(&self, index: &str, api_key: &str) -> Result<String, ServiceError> {
        let url = join_url(&self.config.controller_url, &format!("/indexes/{}", index));
        let request = self.authed(self.client.get(url), api_key);
        let response: DescribeIndexResponse = json(SERVICE, send(SERVICE, request).await?).await?;
        Ok(normalize_host(&response.host))
    }
}

#[async_trait]
impl VectorIndexPort for PineconeIndexAdapter {
    async fn query(
        &self,
        vector: &[f32],
        query: &NamespaceQuery,
    ) -> Result<Vec<VectorMatch>, ServiceError> {
        let api_key = require_api_key(
            self.config.api_key.as_deref(),
            &self.config.api_key_env,
            "Pinecone",
        )?;
        let host = self.host(&api_key).await?;

        let request = self.authed(self.client.post(join_url(host, "/query")), &api_key).json(
            &QueryRequest {
                vector,
                top_k: query.top_k,
                include_metadata: true,
                include_values: false,
                namespace: query.namespace.as_str(),
            },
        );
        let response: QueryResponse = json(SERVICE, send(SERVICE, request).await?).await?;
        debug!(
            namespace = query.namespace.as_str(),
            matches = response.matches.len(),
            "Pinecone query returned"
        );

        Ok(response
            .matches
            .into_iter()
            .map(|m| VectorMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(host: Option<String>, controller: Option<String>) -> PineconeProviderConfig {
        PineconeProviderConfig {
            api_key: Some("pc-test".to_string()),
            api_key_env: "MANA_TEST_PINECONE_KEY_NEVER_SET".to_string(),
            host,
            host_env: "MANA_TEST_PINECONE_HOST_NEVER_SET".to_string(),
            index: Some("mana".to_string()),
            index_env: "MANA_TEST_PINECONE_INDEX_NEVER_SET".to_string(),
            controller_url: controller.unwrap_or_else(|| "http://127.0.0.1:9".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_query_sends_namespace_and_top_k() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(header("Api-Key", "pc-test"))
            .and(body_json(serde_json::json!({
                "vector": [0.5, 0.5],
                "topK": 2,
                "includeMetadata": true,
                "includeValues": false,
                "namespace": "knowledge"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "matches": [
                    {"id": "k1", "score": 0.8, "metadata": {"text": "TREE grows"}},
                    {"id": "k2", "score": 0.4}
                ],
                "namespace": "knowledge"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let adapter =
            PineconeIndexAdapter::new(config(Some(server.uri()), None), Duration::from_secs(5));
        let matches = adapter
            .query(&[0.5, 0.5], &NamespaceQuery::new("knowledge", 2))
            .await
            .unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id.as_deref(), Some("k1"));
        assert_eq!(matches[0].metadata["text"], "TREE grows");
        assert!(matches[1].metadata.is_empty());
    }

    #[tokio::test]
    async fn test_host_looked_up_once_from_control_plane() {
        let data = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"matches": []})))
            .expect(2)
            .mount(&data)
            .await;

        let control = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/mana"))
            .and(header("X-Pinecone-API-Version", "2024-07"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"host": data.uri()})),
            )
            .expect(1)
            .mount(&control)
            .await;

        let adapter =
            PineconeIndexAdapter::new(config(None, Some(control.uri())), Duration::from_secs(5));
        let query = NamespaceQuery::new("MANA", 2);
        adapter.query(&[1.0], &query).await.unwrap();
        adapter.query(&[1.0], &query).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_index_is_config_error() {
        let mut config = config(None, None);
        config.index = None;
        let adapter = PineconeIndexAdapter::new(config, Duration::from_secs(5));

        let err = adapter
            .query(&[1.0], &NamespaceQuery::new("MANA", 2))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Config("Pinecone index not configured".to_string())
        );
    }

    #[tokio::test]
    async fn test_upstream_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let adapter =
            PineconeIndexAdapter::new(config(Some(server.uri()), None), Duration::from_secs(5));
        let err = adapter
            .query(&[1.0], &NamespaceQuery::new("MANA", 2))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UpstreamStatus { status: 503, .. }));
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("mana-x.svc.pinecone.io"), "https://mana-x.svc.pinecone.io");
        assert_eq!(normalize_host("http://localhost:5080/"), "http://localhost:5080");
    }

    #[test]
    fn test_dimension_from_config() {
        let adapter = PineconeIndexAdapter::new(config(None, None), Duration::from_secs(1));
        assert_eq!(adapter.dimension(), 1536);
    }
}
