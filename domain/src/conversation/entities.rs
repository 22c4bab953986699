//! Conversation entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    /// The persona's replies. Older clients send `assistant`.
    #[serde(alias = "assistant")]
    Agent,
    System,
}

impl Role {
    /// Label used when rendering the turn into a prompt.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Agent => "Assistant",
            Role::System => "System",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "agent",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self::new(Role::Agent, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Ordered, append-only sequence of turns.
///
/// Insertion order is chronological order. Turns cannot be edited or removed
/// once appended; [`Conversation::clear`] starts a fresh conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recent `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

impl FromIterator<Turn> for Conversation {
    fn from_iter<I: IntoIterator<Item = Turn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_returns_tail_in_order() {
        let conversation: Conversation = vec![
            Turn::user("one"),
            Turn::agent("two"),
            Turn::user("three"),
        ]
        .into();

        let recent = conversation.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "two");
        assert_eq!(recent[1].content, "three");
    }

    #[test]
    fn test_recent_larger_than_len() {
        let conversation: Conversation = vec![Turn::user("only")].into();
        assert_eq!(conversation.recent(10).len(), 1);
        assert!(Conversation::new().recent(3).is_empty());
    }

    #[test]
    fn test_role_deserialize_accepts_assistant_alias() {
        let turn: Turn = serde_json::from_str(r#"{"role":"assistant","content":"moo"}"#).unwrap();
        assert_eq!(turn.role, Role::Agent);
        let turn: Turn = serde_json::from_str(r#"{"role":"agent","content":"moo"}"#).unwrap();
        assert_eq!(turn.role, Role::Agent);
    }

    #[test]
    fn test_conversation_serializes_as_array() {
        let conversation: Conversation = vec![Turn::user("hi")].into();
        let json = serde_json::to_string(&conversation).unwrap();
        assert_eq!(json, r#"[{"role":"user","content":"hi"}]"#);
    }
}
