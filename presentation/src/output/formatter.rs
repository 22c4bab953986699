//! Output formatter trait

use mana_domain::{ChatResponse, ErrorDescriptor, RetrievalResult};

/// Trait for rendering the outcome of a chat turn
pub trait OutputFormatter {
    /// Format a successful reply and the context it was grounded on
    fn format_reply(&self, response: &ChatResponse, context: &RetrievalResult) -> String;

    /// Format a failed turn
    fn format_error(&self, error: &ErrorDescriptor) -> String;
}
