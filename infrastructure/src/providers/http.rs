//! Shared HTTP plumbing for the service adapters.

use mana_application::ServiceError;
use mana_domain::core::string::preview;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::warn;

/// Longest upstream error body kept in diagnostics.
const MAX_ERROR_BODY: usize = 500;

/// Build a client with a whole-request timeout.
///
/// Falls back to a default client, logged, if the builder cannot be
/// initialised; requests then run without a deadline.
pub fn client_with_timeout(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        warn!(
            timeout_ms = timeout.as_millis() as u64,
            "HTTP client builder failed ({}); requests will not time out",
            e
        );
        Client::new()
    })
}

/// Send a request, turning transport failures and non-2xx statuses into
/// [`ServiceError`]s. The upstream body is kept for diagnostics only.
pub async fn send(service: &'static str, request: RequestBuilder) -> Result<Response, ServiceError> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(service, e))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(
        service,
        status = status.as_u16(),
        body = %preview(&body, MAX_ERROR_BODY),
        "Upstream request failed"
    );
    Err(ServiceError::UpstreamStatus {
        service,
        status: status.as_u16(),
        body: preview(&body, MAX_ERROR_BODY),
    })
}

/// Deserialize a JSON body, reporting shape mismatches as malformed.
pub async fn json<T: serde::de::DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> Result<T, ServiceError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(service, e))?;
    serde_json::from_slice(&bytes).map_err(|e| ServiceError::MalformedResponse {
        service,
        reason: e.to_string(),
    })
}

pub fn transport_error(service: &'static str, e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout { service }
    } else {
        ServiceError::Transport {
            service,
            reason: e.to_string(),
        }
    }
}

/// Join a base URL and a path without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://api.openai.com/", "/v1/embeddings"),
            "https://api.openai.com/v1/embeddings"
        );
        assert_eq!(join_url("http://x", "query"), "http://x/query");
    }

    #[tokio::test]
    async fn test_client_enforces_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = client_with_timeout(Duration::from_millis(50));
        let err = send("openai", client.get(server.uri())).await.unwrap_err();

        assert!(matches!(err, ServiceError::Timeout { service: "openai" }));
    }
}
