//! Infrastructure layer for mana-chat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod audio;
pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
#[cfg(feature = "playback")]
pub use audio::CpalAudioSink;
pub use audio::{ImpulseError, NullAudioSink, WavFileSink, load_impulse};
pub use config::{ConfigLoader, FileConfig, NarrationOutput};
pub use logging::JsonlConversationLogger;
pub use providers::{
    AnthropicCompletionAdapter, ElevenLabsSpeechAdapter, OpenAiEmbeddingAdapter,
    PineconeIndexAdapter,
};
