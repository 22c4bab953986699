//! HTTP handlers for the proxy endpoints.

use super::error::ApiError;
use super::state::AppState;
use axum::Json;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mana_application::TurnOptions;
use mana_domain::{ChatRequest, ChatResponse, ContextSnippet, Turn};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Body of `POST /api/kb`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KbRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub chat_history: Vec<Turn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KbResponse {
    pub results: Vec<ContextSnippet>,
}

/// Body of `POST /api/llm`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub chat_history: Vec<Turn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LlmResponse {
    pub response: String,
}

/// Body of `POST /api/tts`.
#[derive(Debug, Default, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TtsQuery {
    pub encoding: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/kb - ranked context for a query.
pub async fn kb(
    State(state): State<AppState>,
    body: Result<Json<KbRequest>, JsonRejection>,
) -> Result<Json<KbResponse>, ApiError> {
    let Json(request) = body?;
    let query = request.query.unwrap_or_default();

    let result = state
        .retrieve
        .execute(&query, &request.chat_history)
        .await
        .inspect_err(|e| warn!("kb request failed: {}", e))?;

    Ok(Json(KbResponse {
        results: result.into_snippets(),
    }))
}

/// POST /api/llm - one completion over caller-supplied context.
pub async fn llm(
    State(state): State<AppState>,
    body: Result<Json<LlmRequest>, JsonRejection>,
) -> Result<Json<LlmResponse>, ApiError> {
    let Json(request) = body?;
    let message = request.message.unwrap_or_default();
    let context = request.context.unwrap_or_default();

    let response = state
        .complete
        .execute(&message, &request.chat_history, &context)
        .await
        .inspect_err(|e| warn!("llm request failed: {}", e))?;

    Ok(Json(LlmResponse { response }))
}

/// POST /api/tts - synthesized speech, raw or base64.
pub async fn tts(
    State(state): State<AppState>,
    Query(query): Query<TtsQuery>,
    body: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    let base64 = match query.encoding.as_deref() {
        None | Some("raw") => false,
        Some("base64") => true,
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "Unsupported encoding '{}'",
                other
            )));
        }
    };

    let audio = state
        .speech
        .synthesize(request.text.as_deref().unwrap_or_default())
        .await
        .inspect_err(|e| warn!("tts request failed: {}", e))?;
    debug!(bytes = audio.bytes.len(), base64, "Returning speech");

    let content_type = audio.format.content_type();
    let response = if base64 {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::HeaderName::from_static("x-audio-content-type"), content_type),
            ],
            STANDARD.encode(&audio.bytes),
        )
            .into_response()
    } else {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type)],
            Body::from(audio.bytes),
        )
            .into_response()
    };
    Ok(response)
}

/// POST /api/chat - a full orchestrated turn, without narration.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = body?;
    let output = state
        .chat
        .execute(request, TurnOptions::default().without_narration())
        .await?;
    if output.degraded {
        debug!("chat turn answered without context");
    }
    Ok(Json(output.response))
}

/// Any method other than the one a route accepts.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
