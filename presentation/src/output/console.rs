//! Console output formatter for chat turns

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use mana_domain::core::string::preview;
use mana_domain::{
    ChatResponse, ContextSnippet, Conversation, ErrorDescriptor, RetrievalResult, Role,
    TERMINAL_SIGNOFF,
};

/// Formats chat turns for terminal display
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleFormatter {
    /// List the snippets the reply was grounded on
    pub show_sources: bool,
}

impl ConsoleFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(mut self, show: bool) -> Self {
        self.show_sources = show;
        self
    }

    /// The reply body, with the sign-off line dimmed.
    pub fn format_reply_text(reply: &str) -> String {
        let mut output = String::new();
        for line in reply.lines() {
            if line.trim() == TERMINAL_SIGNOFF {
                output.push_str(&format!("{}\n", line.green().dimmed()));
            } else {
                output.push_str(line);
                output.push('\n');
            }
        }
        output
    }

    /// Numbered list of snippets with namespace and score.
    pub fn format_sources(context: &RetrievalResult) -> String {
        let mut output = Self::section_header("Sources");
        if context.is_empty() {
            output.push_str(&format!("  {}\n", "(no context retrieved)".dimmed()));
            return output;
        }
        for (i, snippet) in context.snippets().iter().enumerate() {
            output.push_str(&format!(
                "  {}. {} {} {}\n",
                i + 1,
                format!("[{}]", snippet.namespace).yellow(),
                format!("{:.3}", snippet.score).dimmed(),
                preview(&snippet.content, 70)
            ));
        }
        output
    }

    /// A sampled concept from `/concept`.
    pub fn format_concept(snippet: &ContextSnippet) -> String {
        let mut output = format!(
            "{} {}\n",
            "Concept from".cyan().bold(),
            snippet.namespace.as_str().yellow()
        );
        if let Some(title) = snippet.metadata.get("title").and_then(|v| v.as_str())
            && !title.is_empty()
        {
            output.push_str(&format!("{}\n", title.bold()));
        }
        if snippet.content.is_empty() {
            output.push_str(&format!("{}\n", "(no text)".dimmed()));
        } else {
            output.push_str(&snippet.content);
            output.push('\n');
        }
        for key in ["core_concepts", "key_quotes"] {
            if let Some(value) = snippet.metadata.get(key)
                && let Some(items) = value.as_array()
                && !items.is_empty()
            {
                output.push_str(&format!("\n{}\n", key.replace('_', " ").cyan()));
                for item in items {
                    let text = item.as_str().map(str::to_string).unwrap_or_else(|| item.to_string());
                    output.push_str(&format!("  * {}\n", text));
                }
            }
        }
        output
    }

    /// The turns of a conversation, oldest first.
    pub fn format_history(conversation: &Conversation) -> String {
        if conversation.is_empty() {
            return format!("{}\n", "(no messages yet)".dimmed());
        }
        let mut output = String::new();
        for turn in conversation.turns() {
            let label = format!("{:>6}", role_label(turn.role));
            let label = match turn.role {
                Role::User => label.bold().cyan(),
                Role::Agent => label.bold().green(),
                Role::System => label.bold().red(),
            };
            output.push_str(&format!("{}: {}\n", label, preview(&turn.content, 100)));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}\n", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Agent => "mana",
        Role::System => "system",
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_reply(&self, response: &ChatResponse, context: &RetrievalResult) -> String {
        let mut output = Self::header("MANA");
        output.push('\n');
        output.push_str(&Self::format_reply_text(&response.reply));
        if self.show_sources {
            output.push_str(&Self::format_sources(context));
        }
        output
    }

    fn format_error(&self, error: &ErrorDescriptor) -> String {
        format!("{} {}\n", "Error:".red().bold(), error.message)
    }
}
