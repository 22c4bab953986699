//! Configuration file loading for mana-chat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `MANA_*` environment variables (`__` separates nested keys)
//! 2. `--config <path>` specified file
//! 3. Project root: `./mana.toml` or `./.mana.toml`
//! 4. Global: `~/.config/mana-chat/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileAnthropicConfig, FileChatConfig, FileConfig, FileElevenLabsConfig, FileLoggingConfig,
    FileNamespaceConfig, FileNarrationConfig, FileOpenAiConfig, FileOutputConfig,
    FilePineconeConfig, FileProvidersConfig, FileReplConfig, FileServerConfig,
    FileTimeoutsConfig, NarrationOutput,
};
pub use loader::ConfigLoader;
