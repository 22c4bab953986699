//! Cross-namespace aggregation of retrieved snippets

use super::snippet::ContextSnippet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Upper bound on the number of snippets handed to the prompt.
pub const MAX_SNIPPETS: usize = 5;

/// Snippets ranked by score, highest first, never more than [`MAX_SNIPPETS`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetrievalResult {
    snippets: Vec<ContextSnippet>,
}

impl RetrievalResult {
    /// An empty result, used when the knowledge base is unreachable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rank namespace-tagged matches globally and keep the best `limit`.
    ///
    /// The sort is stable: equal scores keep their input order, so running
    /// this twice on the same input yields the same ordering. `limit` is
    /// clamped to [`MAX_SNIPPETS`]. NaN scores rank below everything.
    pub fn aggregate(mut matches: Vec<ContextSnippet>, limit: usize) -> Self {
        matches.sort_by(|a, b| descending(a.score, b.score));
        matches.truncate(limit.min(MAX_SNIPPETS));
        Self { snippets: matches }
    }

    pub fn snippets(&self) -> &[ContextSnippet] {
        &self.snippets
    }

    pub fn into_snippets(self) -> Vec<ContextSnippet> {
        self.snippets
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    /// Snippet contents joined by newlines, as embedded in the prompt.
    pub fn context_text(&self) -> String {
        self.snippets
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn descending(a: f32, b: f32) -> Ordering {
    let key = |s: f32| if s.is_nan() { f32::NEG_INFINITY } else { s };
    key(b).total_cmp(&key(a))
}
