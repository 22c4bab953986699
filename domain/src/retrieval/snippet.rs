//! Context snippets produced by retrieval

use super::namespace::{Namespace, NamespaceKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Analysis fields nested under `full_analysis` in archive metadata.
const ARCHIVE_ANALYSIS_FIELDS: [&str; 4] = [
    "core_concepts",
    "narratives",
    "technical_insights",
    "key_quotes",
];

/// A raw match returned by the vector index for one namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    #[serde(default)]
    pub id: Option<String>,
    pub score: f32,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl VectorMatch {
    pub fn new(score: f32, metadata: Map<String, Value>) -> Self {
        Self {
            id: None,
            score,
            metadata,
        }
    }
}

/// A retrieved text fragment plus its relevance score.
///
/// Produced fresh for every query; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnippet {
    pub content: String,
    pub score: f32,
    pub namespace: Namespace,
    pub metadata: Map<String, Value>,
}

impl ContextSnippet {
    pub fn new(content: impl Into<String>, score: f32, namespace: Namespace) -> Self {
        Self {
            content: content.into(),
            score,
            namespace,
            metadata: Map::new(),
        }
    }

    /// Build a snippet from an index match, tagging it with its namespace.
    ///
    /// Content is taken from `metadata.text` (empty when absent). The match
    /// id is kept as `metadata.id`. Archive matches additionally get their
    /// analysis payload flattened next to the original fields.
    pub fn from_match(namespace: &Namespace, m: VectorMatch) -> Self {
        let content = m
            .metadata
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut metadata = match namespace.kind() {
            NamespaceKind::Archive => flatten_archive_metadata(m.metadata),
            _ => m.metadata,
        };
        if let Some(id) = m.id {
            metadata.entry("id").or_insert(Value::String(id));
        }

        Self {
            content,
            score: m.score,
            namespace: namespace.clone(),
            metadata,
        }
    }
}

fn flatten_archive_metadata(mut metadata: Map<String, Value>) -> Map<String, Value> {
    let analysis = metadata
        .get("full_analysis")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    for field in ARCHIVE_ANALYSIS_FIELDS {
        let value = analysis
            .get(field)
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        metadata.insert(field.to_string(), value);
    }

    metadata
        .entry("unique_elements")
        .or_insert_with(|| Value::Array(Vec::new()));
    metadata
        .entry("implications")
        .or_insert_with(|| Value::String(String::new()));

    metadata
}
