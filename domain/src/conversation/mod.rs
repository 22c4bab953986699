//! Conversation model: turns, the caller-owned history, and validated messages.

pub mod entities;
pub mod message;
