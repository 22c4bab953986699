//! Logging configuration from TOML (`[logging]` section)

use super::narration::expand_home;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for JSONL conversation transcripts (disabled when unset)
    pub conversation_dir: Option<String>,
}

impl FileLoggingConfig {
    pub fn conversation_dir(&self) -> Option<PathBuf> {
        self.conversation_dir.as_deref().map(expand_home)
    }
}
