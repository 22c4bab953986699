//! Query text used for embedding

use crate::conversation::entities::Turn;

/// Fuse prior turns with the new query for embedding.
///
/// History contents come first, space-separated, followed by the query.
/// The result is only embedded; it never reaches the prompt.
pub fn enhanced_query(history: &[Turn], query: &str) -> String {
    if history.is_empty() {
        return query.to_string();
    }
    let mut parts: Vec<&str> = history.iter().map(|t| t.content.as_str()).collect();
    parts.push(query);
    parts.join(" ")
}
