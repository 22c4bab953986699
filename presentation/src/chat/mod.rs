//! Interactive chat module
//!
//! Provides a line-editor based interactive chat with MANA.

mod repl;

pub use repl::{ChatRepl, ReplCommand};
