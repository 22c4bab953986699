//! Provider configuration from TOML (`[providers]` section)

use mana_domain::{
    AnthropicProviderConfig, ElevenLabsProviderConfig, OpenAiProviderConfig,
    PineconeProviderConfig, ProviderConfig,
};
use serde::{Deserialize, Serialize};

/// Pinecone vector index configuration.
///
/// The index host is taken from `host`, then `$PINECONE_INDEX_HOST`; when
/// neither is set it is looked up once from the control plane by index name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePineconeConfig {
    /// Environment variable name for the API key (default: "PINECONE_API_KEY").
    pub api_key_env: String,
    /// Direct API key; prefer the env var.
    pub api_key: Option<String>,
    /// Environment variable name for the index host.
    pub host_env: String,
    /// Index data-plane host, e.g. `mana-abc123.svc.pinecone.io`.
    pub host: Option<String>,
    /// Environment variable name for the index name.
    pub index_env: String,
    /// Index name, used to look up the host.
    pub index: Option<String>,
    /// Control plane base URL.
    pub controller_url: String,
    /// `X-Pinecone-API-Version` header.
    pub api_version: String,
    /// Dimension of the stored vectors.
    pub dimension: usize,
}

impl Default for FilePineconeConfig {
    fn default() -> Self {
        let d = PineconeProviderConfig::default();
        Self {
            api_key_env: d.api_key_env,
            api_key: d.api_key,
            host_env: d.host_env,
            host: d.host,
            index_env: d.index_env,
            index: d.index,
            controller_url: d.controller_url,
            api_version: d.api_version,
            dimension: d.dimension,
        }
    }
}

/// OpenAI API provider configuration (embeddings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key; prefer the env var.
    pub api_key: Option<String>,
    /// Base URL for the OpenAI API (can be overridden for compatible servers).
    pub base_url: String,
    /// Embedding model name.
    pub embedding_model: String,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        let d = OpenAiProviderConfig::default();
        Self {
            api_key_env: d.api_key_env,
            api_key: d.api_key,
            base_url: d.base_url,
            embedding_model: d.embedding_model,
        }
    }
}

/// Anthropic API provider configuration (completion).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnthropicConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Direct API key; prefer the env var.
    pub api_key: Option<String>,
    /// Base URL for the Anthropic API.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Max tokens per response.
    pub max_tokens: u32,
    /// Anthropic API version header.
    pub api_version: String,
}

impl Default for FileAnthropicConfig {
    fn default() -> Self {
        let d = AnthropicProviderConfig::default();
        Self {
            api_key_env: d.api_key_env,
            api_key: d.api_key,
            base_url: d.base_url,
            model: d.model,
            max_tokens: d.max_tokens,
            api_version: d.api_version,
        }
    }
}

/// ElevenLabs API provider configuration (speech).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileElevenLabsConfig {
    /// Environment variable name for the API key (default: "ELEVENLABS_API_KEY").
    pub api_key_env: String,
    /// Direct API key; prefer the env var.
    pub api_key: Option<String>,
    pub base_url: String,
    pub voice_id: String,
    pub model_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    /// Requested payload format, e.g. `pcm_24000`.
    pub output_format: String,
}

impl Default for FileElevenLabsConfig {
    fn default() -> Self {
        let d = ElevenLabsProviderConfig::default();
        Self {
            api_key_env: d.api_key_env,
            api_key: d.api_key,
            base_url: d.base_url,
            voice_id: d.voice_id,
            model_id: d.model_id,
            stability: d.stability,
            similarity_boost: d.similarity_boost,
            style: d.style,
            output_format: d.output_format,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Pinecone vector index settings.
    pub pinecone: FilePineconeConfig,
    /// OpenAI embedding settings.
    pub openai: FileOpenAiConfig,
    /// Anthropic completion settings.
    pub anthropic: FileAnthropicConfig,
    /// ElevenLabs speech settings.
    pub elevenlabs: FileElevenLabsConfig,
}

impl FileProvidersConfig {
    /// Convert to the domain provider configuration.
    pub fn to_provider_config(&self) -> ProviderConfig {
        let p = &self.pinecone;
        let o = &self.openai;
        let a = &self.anthropic;
        let e = &self.elevenlabs;
        ProviderConfig {
            pinecone: PineconeProviderConfig {
                api_key_env: p.api_key_env.clone(),
                api_key: p.api_key.clone(),
                host_env: p.host_env.clone(),
                host: p.host.clone(),
                index_env: p.index_env.clone(),
                index: p.index.clone(),
                controller_url: p.controller_url.clone(),
                api_version: p.api_version.clone(),
                dimension: p.dimension,
            },
            openai: OpenAiProviderConfig {
                api_key_env: o.api_key_env.clone(),
                api_key: o.api_key.clone(),
                base_url: o.base_url.clone(),
                embedding_model: o.embedding_model.clone(),
            },
            anthropic: AnthropicProviderConfig {
                api_key_env: a.api_key_env.clone(),
                api_key: a.api_key.clone(),
                base_url: a.base_url.clone(),
                model: a.model.clone(),
                max_tokens: a.max_tokens,
                api_version: a.api_version.clone(),
            },
            elevenlabs: ElevenLabsProviderConfig {
                api_key_env: e.api_key_env.clone(),
                api_key: e.api_key.clone(),
                base_url: e.base_url.clone(),
                voice_id: e.voice_id.clone(),
                model_id: e.model_id.clone(),
                stability: e.stability,
                similarity_boost: e.similarity_boost,
                style: e.style,
                output_format: e.output_format.clone(),
            },
        }
    }
}
