//! Chat message value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A validated user message (Value Object)
///
/// Guaranteed to contain at least one non-whitespace character. The content
/// is stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChatMessage {
    content: String,
}

impl ChatMessage {
    /// Validate raw input, rejecting empty or whitespace-only text.
    pub fn parse(content: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = content.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        Ok(Self {
            content: trimmed.to_string(),
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<String> for ChatMessage {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ChatMessage> for String {
    fn from(message: ChatMessage) -> Self {
        message.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let message = ChatMessage::parse("  What is MANA?\n").unwrap();
        assert_eq!(message.content(), "What is MANA?");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(ChatMessage::parse(""), Err(DomainError::EmptyMessage));
        assert_eq!(ChatMessage::parse(" \t\n "), Err(DomainError::EmptyMessage));
    }

    #[test]
    fn test_deserialize_rejects_blank() {
        assert!(serde_json::from_str::<ChatMessage>(r#""   ""#).is_err());
        let message: ChatMessage = serde_json::from_str(r#""moo""#).unwrap();
        assert_eq!(message.content(), "moo");
    }
}
