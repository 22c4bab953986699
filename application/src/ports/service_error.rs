//! Error type shared by all remote-service ports
//!
//! Every adapter reports failures as a [`ServiceError`]. The variants keep the
//! upstream status and body for diagnostics; [`ServiceError::descriptor`]
//! turns any of them into the user-facing [`ErrorDescriptor`], which never
//! carries raw upstream payloads.

use mana_domain::{ErrorDescriptor, ErrorKind};
use thiserror::Error;

/// Errors that can occur while talking to a remote service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Config(String),

    #[error("{service} returned HTTP {status}: {body}")]
    UpstreamStatus {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned an empty completion")]
    EmptyCompletion { service: &'static str },

    #[error("{service} returned a malformed response: {reason}")]
    MalformedResponse {
        service: &'static str,
        reason: String,
    },

    #[error("{service} request failed: {reason}")]
    Transport {
        service: &'static str,
        reason: String,
    },

    #[error("{service} timed out")]
    Timeout { service: &'static str },

    #[error("Cancelled")]
    Cancelled,
}

impl ServiceError {
    /// Map onto the three-way taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::Config(_) => ErrorKind::Config,
            ServiceError::UpstreamStatus { .. }
            | ServiceError::EmptyCompletion { .. }
            | ServiceError::MalformedResponse { .. }
            | ServiceError::Transport { .. }
            | ServiceError::Timeout { .. }
            | ServiceError::Cancelled => ErrorKind::Upstream,
        }
    }

    /// The user-facing form of this error.
    pub fn descriptor(&self) -> ErrorDescriptor {
        match self {
            ServiceError::Validation(message) => ErrorDescriptor::validation(message.clone()),
            ServiceError::Config(message) => ErrorDescriptor::config(message.clone()),
            _ => ErrorDescriptor::upstream(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ServiceError::Cancelled)
    }

    /// Name of the remote service involved, if any.
    pub fn service(&self) -> Option<&'static str> {
        match self {
            ServiceError::UpstreamStatus { service, .. }
            | ServiceError::EmptyCompletion { service }
            | ServiceError::MalformedResponse { service, .. }
            | ServiceError::Transport { service, .. }
            | ServiceError::Timeout { service } => Some(service),
            _ => None,
        }
    }
}
