//! Chat request/response values

use crate::conversation::entities::Conversation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown to the user whenever the reply could not be produced upstream.
pub const GENERIC_FAILURE_MESSAGE: &str = "Sorry, I encountered an error processing your message.";

/// A user message plus the caller-owned history.
///
/// The message is validated by the orchestrator, not here, so that empty
/// input can be rejected with a descriptor instead of a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Conversation,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            history: Conversation::new(),
        }
    }

    pub fn with_history(mut self, history: Conversation) -> Self {
        self.history = history;
        self
    }
}

/// A successful reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Three-way failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or missing caller input. Never retried.
    Validation,
    /// Missing deployment configuration. Operator-fixable.
    Config,
    /// Remote dependency failure or malformed remote response.
    Upstream,
}

impl ErrorKind {
    /// HTTP status class for this kind.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Config => 500,
            ErrorKind::Upstream => 502,
        }
    }

    /// Whether re-issuing the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Upstream)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Config => "config",
            ErrorKind::Upstream => "upstream",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing error. Never carries raw upstream payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub kind: ErrorKind,
    #[serde(rename = "error")]
    pub message: String,
}

impl ErrorDescriptor {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// The generic upstream failure, identical for every upstream cause.
    pub fn upstream() -> Self {
        Self::new(ErrorKind::Upstream, GENERIC_FAILURE_MESSAGE)
    }
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
