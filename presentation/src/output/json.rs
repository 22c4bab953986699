//! JSON output (`--json`)

use crate::output::formatter::OutputFormatter;
use mana_domain::{ChatResponse, ErrorDescriptor, RetrievalResult};

/// Prints `{reply}` or `{error, kind}`, one object per turn.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_reply(&self, response: &ChatResponse, _context: &RetrievalResult) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_error(&self, error: &ErrorDescriptor) -> String {
        serde_json::to_string_pretty(error).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_reply_object() {
        let out = JsonFormatter.format_reply(
            &ChatResponse {
                reply: "Moo.".to_string(),
            },
            &RetrievalResult::empty(),
        );
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, serde_json::json!({"reply": "Moo."}));
    }

    #[test]
    fn test_error_object_has_kind() {
        let out = JsonFormatter.format_error(&ErrorDescriptor::upstream());
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["kind"], "upstream");
        assert_eq!(
            value["error"],
            "Sorry, I encountered an error processing your message."
        );
    }
}
