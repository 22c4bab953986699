//! Remote service adapters
//!
//! One adapter per port, each a thin `reqwest` client over the vendor's
//! JSON API. Credentials are resolved on every call so a missing key
//! surfaces as a configuration error for that call only.

pub mod anthropic;
pub mod credentials;
pub mod elevenlabs;
pub mod http;
pub mod openai;
pub mod pinecone;

pub use anthropic::AnthropicCompletionAdapter;
pub use elevenlabs::ElevenLabsSpeechAdapter;
pub use openai::OpenAiEmbeddingAdapter;
pub use pinecone::PineconeIndexAdapter;
