//! Presentation layer for mana-chat
//!
//! This crate contains the CLI definition, output formatters, progress
//! indicators, the interactive chat REPL and the HTTP proxy server.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;
pub mod server;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand};
pub use cli::commands::Cli;
pub use config::{OutputConfig, ReplConfig};
pub use output::{ConsoleFormatter, JsonFormatter, OutputFormatter, formatter_for};
pub use progress::{NarrationIndicator, SimpleProgress, TurnProgressReporter};
pub use server::{AppState, create_router, start_server};
