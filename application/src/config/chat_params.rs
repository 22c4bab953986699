//! Chat parameters: use case behaviour control.
//!
//! [`ChatParams`] groups the static parameters that control a chat turn:
//! which namespaces are queried, how many snippets survive aggregation, and
//! how much history feeds the embedding and the prompt. These are
//! application-layer concerns, not domain policy.

use mana_domain::{MAX_SNIPPETS, MixSettings, NamespaceQuery};
use serde::{Deserialize, Serialize};

/// Retrieval and prompt parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatParams {
    /// Namespaces queried per turn, each with its own result count.
    pub namespaces: Vec<NamespaceQuery>,
    /// Snippets kept after aggregation (capped at [`MAX_SNIPPETS`]).
    pub max_snippets: usize,
    /// Most recent turns fused into the embedding query.
    pub max_history_turns: usize,
    /// Most recent turns rendered into the prompt.
    pub max_prompt_turns: usize,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            namespaces: NamespaceQuery::default_fan_out(),
            max_snippets: MAX_SNIPPETS,
            max_history_turns: 10,
            max_prompt_turns: 20,
        }
    }
}

impl ChatParams {
    // ==================== Builder Methods ====================

    pub fn with_namespaces(mut self, namespaces: Vec<NamespaceQuery>) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn with_max_snippets(mut self, max: usize) -> Self {
        self.max_snippets = max.min(MAX_SNIPPETS);
        self
    }

    pub fn with_max_history_turns(mut self, max: usize) -> Self {
        self.max_history_turns = max;
        self
    }

    pub fn with_max_prompt_turns(mut self, max: usize) -> Self {
        self.max_prompt_turns = max;
        self
    }
}

/// Narration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NarrationParams {
    pub enabled: bool,
    pub mix: MixSettings,
}

impl Default for NarrationParams {
    fn default() -> Self {
        Self {
            enabled: true,
            mix: MixSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fan_out() {
        let params = ChatParams::default();
        let names: Vec<_> = params
            .namespaces
            .iter()
            .map(|q| q.namespace.as_str())
            .collect();
        assert_eq!(names, vec!["MANA", "knowledge", "backrooms"]);
        assert!(params.namespaces.iter().all(|q| q.top_k == 2));
        assert_eq!(params.max_snippets, 5);
    }

    #[test]
    fn test_max_snippets_capped() {
        let params = ChatParams::default().with_max_snippets(50);
        assert_eq!(params.max_snippets, MAX_SNIPPETS);
    }
}
