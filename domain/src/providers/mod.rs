//! Provider configuration types (provider-neutral, serde-free).
//!
//! These types define the shape of remote-service settings without depending
//! on any serialization format (TOML, JSON, etc.). Credentials are resolved
//! `api_key` first, then the environment variable named by `api_key_env`.

use std::time::Duration;

/// Settings for all four remote services.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub pinecone: PineconeProviderConfig,
    pub openai: OpenAiProviderConfig,
    pub anthropic: AnthropicProviderConfig,
    pub elevenlabs: ElevenLabsProviderConfig,
}

/// Vector index settings.
#[derive(Debug, Clone)]
pub struct PineconeProviderConfig {
    /// Environment variable name for the API key (default: "PINECONE_API_KEY").
    pub api_key_env: String,
    pub api_key: Option<String>,
    /// Environment variable holding the index data-plane host.
    pub host_env: String,
    /// Index data-plane host, e.g. `https://mana-abc123.svc.aped-1234.pinecone.io`.
    pub host: Option<String>,
    /// Environment variable holding the index name.
    pub index_env: String,
    /// Index name, used to look up the host when none is configured.
    pub index: Option<String>,
    /// Control-plane URL for index host lookup.
    pub controller_url: String,
    /// `X-Pinecone-API-Version` header.
    pub api_version: String,
    /// Dimension of the index vectors.
    pub dimension: usize,
}

impl Default for PineconeProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "PINECONE_API_KEY".to_string(),
            api_key: None,
            host_env: "PINECONE_INDEX_HOST".to_string(),
            host: None,
            index_env: "PINECONE_INDEX".to_string(),
            index: None,
            controller_url: "https://api.pinecone.io".to_string(),
            api_version: "2024-07".to_string(),
            dimension: 1536,
        }
    }
}

/// Embedding service settings.
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub embedding_model: String,
}

impl Default for OpenAiProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
        }
    }
}

/// Completion service settings.
#[derive(Debug, Clone)]
pub struct AnthropicProviderConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Max tokens per response (default: 1024).
    pub max_tokens: u32,
    /// Anthropic API version header.
    pub api_version: String,
}

impl Default for AnthropicProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-sonnet-20240229".to_string(),
            max_tokens: 1024,
            api_version: "2023-06-01".to_string(),
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone)]
pub struct ElevenLabsProviderConfig {
    /// Environment variable name for the API key (default: "ELEVENLABS_API_KEY").
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub voice_id: String,
    pub model_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    /// Requested payload encoding, e.g. `pcm_24000`.
    pub output_format: String,
}

impl Default for ElevenLabsProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ELEVENLABS_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.elevenlabs.io".to_string(),
            voice_id: "OZqXgT52lc0I3Z1rz8Az".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            stability: 0.5,
            similarity_boost: 0.7,
            style: 0.2,
            output_format: "pcm_24000".to_string(),
        }
    }
}

/// Upper bound per upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceTimeouts {
    pub embedding: Duration,
    pub vector_query: Duration,
    pub completion: Duration,
    pub speech: Duration,
}

impl Default for ServiceTimeouts {
    fn default() -> Self {
        Self {
            embedding: Duration::from_secs(15),
            vector_query: Duration::from_secs(10),
            completion: Duration::from_secs(60),
            speech: Duration::from_secs(60),
        }
    }
}
