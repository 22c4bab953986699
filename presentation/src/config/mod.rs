//! Presentation-level configuration
//!
//! Configuration for output formatting and REPL behavior.

use mana_domain::OutputFormat;
use std::path::PathBuf;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// How single-shot replies are printed
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplConfig {
    /// Show the spinner while a turn is in flight
    pub show_progress: bool,
    /// Path to history file; no persistent history when `None`
    pub history_file: Option<PathBuf>,
    /// Narrate replies (toggled with `/narrate`)
    pub narrate: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
            narrate: true,
        }
    }
}
