//! Application layer for mana-chat
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ChatParams, NarrationParams};
pub use ports::{
    audio_output::{AudioOutputPort, PlaybackError},
    completion::CompletionPort,
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    embedding::EmbeddingPort,
    observer::{NarrationObserver, NoNarrationObserver, NoTurnObserver, TurnObserver},
    service_error::ServiceError,
    speech::{SpeechAudio, SpeechPort},
    vector_index::VectorIndexPort,
};
pub use use_cases::complete_reply::CompleteReplyUseCase;
pub use use_cases::narrate::{NarrationError, NarrationOutcome, NarrationPipeline, StopReason};
pub use use_cases::retrieve_context::RetrieveContextUseCase;
pub use use_cases::sample_concept::SampleConceptUseCase;
pub use use_cases::submit_chat_turn::{
    ChatTurnError, ChatTurnOutput, NarrationHandle, SubmitChatTurnUseCase, TurnOptions,
};
