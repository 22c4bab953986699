//! Prompt persona and formatting

pub mod persona;
pub mod template;

pub use persona::{CHAT_PERSONA, SYSTEM_DIRECTIVE, TERMINAL_SIGNOFF};
pub use template::ChatPromptTemplate;
