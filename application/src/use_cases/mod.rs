//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod complete_reply;
pub mod narrate;
pub mod retrieve_context;
pub mod sample_concept;
pub mod submit_chat_turn;

#[cfg(test)]
pub(crate) mod test_support;
