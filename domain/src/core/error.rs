//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Message is required")]
    EmptyMessage,

    #[error("Audio decode error: {0}")]
    AudioDecode(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedAudioFormat(String),

    #[error("Invalid mix graph: {0}")]
    InvalidGraph(String),

    #[error("Illegal turn transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },
}

impl DomainError {
    /// Check if this error came from turning bytes into samples
    pub fn is_audio_error(&self) -> bool {
        matches!(
            self,
            DomainError::AudioDecode(_) | DomainError::UnsupportedAudioFormat(_)
        )
    }
}
