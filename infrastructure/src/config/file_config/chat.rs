//! Chat configuration from TOML (`[chat]` section)

use mana_application::ChatParams;
use mana_domain::{
    ConfigIssue, ConfigIssueCode, MAX_SNIPPETS, NamespaceQuery, ServiceTimeouts,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One namespace queried per turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNamespaceConfig {
    pub name: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    mana_domain::retrieval::namespace::DEFAULT_TOP_K
}

/// Per-service request timeouts in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTimeoutsConfig {
    pub embedding_secs: u64,
    pub vector_query_secs: u64,
    pub completion_secs: u64,
    pub speech_secs: u64,
}

impl Default for FileTimeoutsConfig {
    fn default() -> Self {
        let d = ServiceTimeouts::default();
        Self {
            embedding_secs: d.embedding.as_secs(),
            vector_query_secs: d.vector_query.as_secs(),
            completion_secs: d.completion.as_secs(),
            speech_secs: d.speech.as_secs(),
        }
    }
}

/// Raw chat configuration from TOML
///
/// # Example
///
/// ```toml
/// [chat]
/// max_snippets = 5
/// max_history_turns = 10
///
/// [[chat.namespaces]]
/// name = "MANA"
/// top_k = 2
///
/// [chat.timeouts]
/// completion_secs = 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    pub namespaces: Vec<FileNamespaceConfig>,
    pub max_snippets: usize,
    pub max_history_turns: usize,
    pub max_prompt_turns: usize,
    pub timeouts: FileTimeoutsConfig,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        let params = ChatParams::default();
        Self {
            namespaces: params
                .namespaces
                .iter()
                .map(|q| FileNamespaceConfig {
                    name: q.namespace.as_str().to_string(),
                    top_k: q.top_k,
                })
                .collect(),
            max_snippets: params.max_snippets,
            max_history_turns: params.max_history_turns,
            max_prompt_turns: params.max_prompt_turns,
            timeouts: FileTimeoutsConfig::default(),
        }
    }
}

impl FileChatConfig {
    pub fn to_chat_params(&self) -> ChatParams {
        ChatParams::default()
            .with_namespaces(
                self.namespaces
                    .iter()
                    .filter(|ns| !ns.name.trim().is_empty() && ns.top_k > 0)
                    .map(|ns| NamespaceQuery::new(ns.name.trim(), ns.top_k))
                    .collect(),
            )
            .with_max_snippets(self.max_snippets)
            .with_max_history_turns(self.max_history_turns)
            .with_max_prompt_turns(self.max_prompt_turns)
    }

    pub fn to_timeouts(&self) -> ServiceTimeouts {
        let t = &self.timeouts;
        ServiceTimeouts {
            embedding: Duration::from_secs(t.embedding_secs),
            vector_query: Duration::from_secs(t.vector_query_secs),
            completion: Duration::from_secs(t.completion_secs),
            speech: Duration::from_secs(t.speech_secs),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.namespaces.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::NoNamespaces,
                "chat.namespaces is empty; every turn will run without context",
            ));
        }
        for ns in &self.namespaces {
            if ns.name.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyNamespaceName,
                    "chat.namespaces: namespace name must not be empty",
                ));
            } else if ns.top_k == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroTopK {
                        namespace: ns.name.clone(),
                    },
                    format!("chat.namespaces: '{}' has top_k = 0", ns.name),
                ));
            }
        }

        if self.max_snippets == 0 || self.max_snippets > MAX_SNIPPETS {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "chat.max_snippets".to_string(),
                    value: self.max_snippets.to_string(),
                },
                format!(
                    "chat.max_snippets: {} is outside 1..={}, clamping",
                    self.max_snippets, MAX_SNIPPETS
                ),
            ));
        }

        let t = &self.timeouts;
        for (field, secs) in [
            ("chat.timeouts.embedding_secs", t.embedding_secs),
            ("chat.timeouts.vector_query_secs", t.vector_query_secs),
            ("chat.timeouts.completion_secs", t.completion_secs),
            ("chat.timeouts.speech_secs", t.speech_secs),
        ] {
            if secs == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::OutOfRange {
                        field: field.to_string(),
                        value: "0".to_string(),
                    },
                    format!("{}: timeout must be at least one second", field),
                ));
            }
        }

        issues
    }
}
