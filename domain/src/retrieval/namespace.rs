//! Vector index namespaces

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace holding the project's own lore.
pub const PRIMARY_NAMESPACE: &str = "MANA";
/// Namespace holding general token/ecosystem knowledge.
pub const KNOWLEDGE_NAMESPACE: &str = "knowledge";
/// Namespace holding analysed raw transcripts.
pub const ARCHIVE_NAMESPACE: &str = "backrooms";

/// Matches requested per namespace unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 2;

/// Which kind of collection a namespace holds.
///
/// Archive matches carry an analysis payload that is flattened into the
/// snippet metadata; all other kinds pass metadata through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceKind {
    Primary,
    Knowledge,
    Archive,
    Other,
}

/// A partition of the vector index (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn primary() -> Self {
        Self::new(PRIMARY_NAMESPACE)
    }

    pub fn knowledge() -> Self {
        Self::new(KNOWLEDGE_NAMESPACE)
    }

    pub fn archive() -> Self {
        Self::new(ARCHIVE_NAMESPACE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> NamespaceKind {
        match self.0.as_str() {
            PRIMARY_NAMESPACE => NamespaceKind::Primary,
            KNOWLEDGE_NAMESPACE => NamespaceKind::Knowledge,
            ARCHIVE_NAMESPACE => NamespaceKind::Archive,
            _ => NamespaceKind::Other,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One leg of the retrieval fan-out: a namespace and how many matches to
/// request from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceQuery {
    pub namespace: Namespace,
    pub top_k: usize,
}

impl NamespaceQuery {
    pub fn new(namespace: impl Into<Namespace>, top_k: usize) -> Self {
        Self {
            namespace: namespace.into(),
            top_k,
        }
    }

    /// The three-namespace fan-out the knowledge base was built for.
    pub fn default_fan_out() -> Vec<NamespaceQuery> {
        vec![
            NamespaceQuery::new(Namespace::primary(), DEFAULT_TOP_K),
            NamespaceQuery::new(Namespace::knowledge(), DEFAULT_TOP_K),
            NamespaceQuery::new(Namespace::archive(), DEFAULT_TOP_K),
        ]
    }
}

impl From<Namespace> for NamespaceQuery {
    fn from(namespace: Namespace) -> Self {
        Self::new(namespace, DEFAULT_TOP_K)
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_detection() {
        assert_eq!(Namespace::primary().kind(), NamespaceKind::Primary);
        assert_eq!(Namespace::knowledge().kind(), NamespaceKind::Knowledge);
        assert_eq!(Namespace::archive().kind(), NamespaceKind::Archive);
        assert_eq!(Namespace::new("tweets").kind(), NamespaceKind::Other);
    }

    #[test]
    fn test_default_fan_out() {
        let fan_out = NamespaceQuery::default_fan_out();
        let names: Vec<_> = fan_out.iter().map(|q| q.namespace.as_str()).collect();
        assert_eq!(names, vec!["MANA", "knowledge", "backrooms"]);
        assert!(fan_out.iter().all(|q| q.top_k == 2));
    }
}
