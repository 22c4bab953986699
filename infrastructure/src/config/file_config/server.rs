//! Server configuration from TOML (`[server]` section)

use mana_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Raw HTTP server configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Listen address for `--serve`
    pub bind: String,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
        }
    }
}

impl FileServerConfig {
    pub fn parse_bind(&self) -> Result<SocketAddr, ConfigIssue> {
        self.bind.parse().map_err(|_| {
            ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "server.bind".to_string(),
                    value: self.bind.clone(),
                },
                format!("server.bind: '{}' is not a socket address", self.bind),
            )
        })
    }
}
