//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod chat;
mod logging;
mod narration;
mod output;
mod providers;
mod repl;
mod server;

pub use chat::{FileChatConfig, FileNamespaceConfig, FileTimeoutsConfig};
pub use logging::FileLoggingConfig;
pub use narration::{FileNarrationConfig, NarrationOutput};
pub use output::FileOutputConfig;
pub use providers::{
    FileAnthropicConfig, FileElevenLabsConfig, FileOpenAiConfig, FilePineconeConfig,
    FileProvidersConfig,
};
pub use repl::FileReplConfig;
pub use server::FileServerConfig;

use mana_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Remote service settings and credentials
    pub providers: FileProvidersConfig,
    /// Retrieval fan-out, history caps and timeouts
    pub chat: FileChatConfig,
    /// Narration mix and output
    pub narration: FileNarrationConfig,
    /// HTTP proxy server
    pub server: FileServerConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Conversation transcript settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Namespace list, per-namespace top_k, snippet cap and timeouts
    /// 2. Narration gains, pan and output kind
    /// 3. Server bind address
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.chat.validate());
        issues.extend(self.narration.validate());
        if let Err(issue) = self.server.parse_bind() {
            issues.push(issue);
        }

        issues
    }
}
