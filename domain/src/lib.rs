//! Domain layer for mana-chat
//!
//! This crate contains the core types and pure algorithms of the chat
//! pipeline. It has no dependencies on infrastructure or presentation
//! concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Chat turn
//!
//! One user message plus caller-owned history flows through
//! retrieval → aggregation → prompt formatting → completion, with optional
//! narration afterwards. [`TurnPhase`] models the per-turn state machine.
//!
//! ## Retrieval
//!
//! Matches from several index namespaces are tagged as [`ContextSnippet`]s
//! and ranked globally by [`RetrievalResult::aggregate`], keeping at most
//! [`MAX_SNIPPETS`].
//!
//! ## Narration audio
//!
//! Speech payloads are decoded into an [`AudioBuffer`] and rendered through a
//! declarative [`MixGraph`] (dry gain, convolution reverb, stereo panner).

pub mod audio;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod core;
pub mod prompt;
pub mod providers;
pub mod retrieval;

// Re-export commonly used types
pub use audio::{AudioBuffer, AudioFormat, MixGraph, MixNode, MixSettings};
pub use chat::{
    ChatRequest, ChatResponse, ErrorDescriptor, ErrorKind, GENERIC_FAILURE_MESSAGE, TurnPhase,
    TurnState,
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use conversation::{
    entities::{Conversation, Role, Turn},
    message::ChatMessage,
};
pub use core::error::DomainError;
pub use prompt::{CHAT_PERSONA, ChatPromptTemplate, SYSTEM_DIRECTIVE, TERMINAL_SIGNOFF};
pub use providers::{
    AnthropicProviderConfig, ElevenLabsProviderConfig, OpenAiProviderConfig,
    PineconeProviderConfig, ProviderConfig, ServiceTimeouts,
};
pub use retrieval::{
    ContextSnippet, MAX_SNIPPETS, Namespace, NamespaceKind, NamespaceQuery, RetrievalResult,
    VectorMatch, enhanced_query,
};
