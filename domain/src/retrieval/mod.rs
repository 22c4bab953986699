//! Retrieval domain: namespaces, matches, snippets and cross-namespace ranking.
//!
//! The remote index is queried once per [`NamespaceQuery`]; every match is
//! tagged with its namespace as a [`ContextSnippet`] and the combined list is
//! ranked by [`RetrievalResult::aggregate`].

pub mod aggregate;
pub mod namespace;
pub mod query;
pub mod snippet;

pub use aggregate::{MAX_SNIPPETS, RetrievalResult};
pub use namespace::{Namespace, NamespaceKind, NamespaceQuery};
pub use query::enhanced_query;
pub use snippet::{ContextSnippet, VectorMatch};
