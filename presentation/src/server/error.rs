//! API error responses
//!
//! Every failure is returned as JSON with an `error` message. Turn-level
//! failures also carry the `kind` of the error, and their status follows it.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mana_application::{ChatTurnError, ServiceError};
use mana_domain::ErrorDescriptor;
use serde::Serialize;

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - unreadable body or unsupported parameter.
    BadRequest(String),
    /// 405 Method Not Allowed.
    MethodNotAllowed,
    /// Classified failure; status from its kind.
    Descriptor(ErrorDescriptor),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error })).into_response()
            }
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(ErrorBody {
                    error: "Method Not Allowed".to_string(),
                }),
            )
                .into_response(),
            ApiError::Descriptor(descriptor) => {
                let status = StatusCode::from_u16(descriptor.kind.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(descriptor)).into_response()
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Descriptor(err.descriptor())
    }
}

impl From<ChatTurnError> for ApiError {
    fn from(err: ChatTurnError) -> Self {
        ApiError::Descriptor(err.descriptor)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
