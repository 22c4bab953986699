//! Output formatting for chat turns

pub mod console;
pub mod formatter;
pub mod json;

pub use console::ConsoleFormatter;
pub use formatter::OutputFormatter;
pub use json::JsonFormatter;

use mana_domain::OutputFormat;

/// Pick the formatter for an output format.
pub fn formatter_for(format: OutputFormat, show_sources: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(ConsoleFormatter::new().with_sources(show_sources)),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
