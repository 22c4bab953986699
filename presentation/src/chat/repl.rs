//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::config::ReplConfig;
use crate::output::{ConsoleFormatter, OutputFormatter};
use crate::progress::NarrationIndicator;
use colored::Colorize;
use mana_application::{SampleConceptUseCase, SubmitChatTurnUseCase, TurnOptions};
use mana_domain::{ChatRequest, Conversation, Namespace, Turn};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const HISTORY_CAPACITY: usize = 1000;

/// A parsed slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Clear,
    History,
    /// Sample a concept, from the archive namespace unless one is named
    Concept(Option<String>),
    /// Turn narration on/off; `None` reports the current setting
    Narrate(Option<bool>),
    Quit,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line starting with `/`.
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        match name {
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/clear" => ReplCommand::Clear,
            "/history" => ReplCommand::History,
            "/concept" => ReplCommand::Concept(arg.map(str::to_string)),
            "/narrate" => match arg {
                None => ReplCommand::Narrate(None),
                Some("on") => ReplCommand::Narrate(Some(true)),
                Some("off") => ReplCommand::Narrate(Some(false)),
                Some(_) => ReplCommand::Unknown(line.to_string()),
            },
            _ => ReplCommand::Unknown(line.to_string()),
        }
    }
}

/// Interactive chat REPL
///
/// Owns the conversation: successful turns are appended as a user/agent
/// pair; failed turns are shown but never sent upstream as history.
pub struct ChatRepl {
    use_case: Arc<SubmitChatTurnUseCase>,
    sampler: Option<SampleConceptUseCase>,
    indicator: Option<Arc<NarrationIndicator>>,
    config: ReplConfig,
    conversation: Conversation,
    formatter: ConsoleFormatter,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(use_case: Arc<SubmitChatTurnUseCase>) -> Self {
        Self {
            use_case,
            sampler: None,
            indicator: None,
            config: ReplConfig::default(),
            conversation: Conversation::new(),
            formatter: ConsoleFormatter::new(),
        }
    }

    /// Enable `/concept`
    pub fn with_sampler(mut self, sampler: SampleConceptUseCase) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Show the narration state in the prompt
    pub fn with_indicator(mut self, indicator: Arc<NarrationIndicator>) -> Self {
        self.indicator = Some(indicator);
        self
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut editor = Reedline::create();
        if let Some(path) = &self.config.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
                Ok(history) => editor = editor.with_history(Box::new(history)),
                Err(e) => warn!("Could not open REPL history {}: {}", path.display(), e),
            }
        }

        self.print_welcome();

        loop {
            let prompt = self.prompt();
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(ReplCommand::parse(line)).await {
                            break;
                        }
                        continue;
                    }

                    self.process_message(line).await;
                }
                Signal::CtrlC => {
                    if self.stop_narration() {
                        println!("{}", "(narration stopped)".dimmed());
                    } else {
                        println!("^C");
                    }
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        self.stop_narration();
        Ok(())
    }

    fn prompt(&self) -> DefaultPrompt {
        let speaking = self.indicator.as_ref().is_some_and(|i| i.is_visible());
        let label = if speaking { "mana ♪" } else { "mana" };
        DefaultPrompt::new(
            DefaultPromptSegment::Basic(label.to_string()),
            DefaultPromptSegment::Empty,
        )
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│        MANA - guide of the digital seeds    │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        let namespaces = self
            .use_case
            .params()
            .namespaces
            .iter()
            .map(|q| format!("{} (top {})", q.namespace, q.top_k))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Knowledge: {}", namespaces);
        println!(
            "Narration: {}",
            if self.narration_available() {
                if self.config.narrate { "on" } else { "off" }
            } else {
                "unavailable"
            }
        );
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?       - Show this help");
        println!("  /history            - Show the conversation so far");
        println!("  /clear              - Start a fresh conversation");
        println!("  /concept [ns]       - Draw a random concept from a namespace");
        println!("  /narrate [on|off]   - Toggle spoken replies");
        println!("  /quit, /exit, /q    - Exit chat");
        println!();
    }

    fn narration_available(&self) -> bool {
        self.use_case.narration().is_some()
    }

    /// Stop any narration in progress. Returns whether one was playing.
    fn stop_narration(&self) -> bool {
        match self.use_case.narration() {
            Some(pipeline) if pipeline.is_narrating() => {
                pipeline.stop();
                true
            }
            _ => false,
        }
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => {
                println!();
                Self::print_help();
            }
            ReplCommand::Clear => {
                self.stop_narration();
                self.conversation.clear();
                println!("{}", "Conversation cleared.".dimmed());
            }
            ReplCommand::History => {
                println!();
                print!("{}", ConsoleFormatter::format_history(&self.conversation));
                println!();
            }
            ReplCommand::Concept(namespace) => self.sample_concept(namespace).await,
            ReplCommand::Narrate(None) => {
                println!(
                    "Narration is {}",
                    if self.config.narrate { "on" } else { "off" }
                );
            }
            ReplCommand::Narrate(Some(on)) => {
                if on && !self.narration_available() {
                    println!("Narration is not configured.");
                } else {
                    self.config.narrate = on;
                    if !on {
                        self.stop_narration();
                    }
                    println!("Narration {}", if on { "on" } else { "off" });
                }
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn sample_concept(&self, namespace: Option<String>) {
        let Some(sampler) = &self.sampler else {
            println!("Concept sampling is not available.");
            return;
        };
        let namespace = namespace.map(Namespace::new).unwrap_or_else(Namespace::archive);

        println!();
        match sampler.execute(namespace.clone()).await {
            Ok(Some(snippet)) => print!("{}", ConsoleFormatter::format_concept(&snippet)),
            Ok(None) => println!("No concepts found in {}.", namespace),
            Err(e) => {
                warn!("Concept sampling failed: {}", e);
                print!("{}", self.formatter.format_error(&e.descriptor()));
            }
        }
        println!();
    }

    async fn process_message(&mut self, message: &str) {
        println!();

        let cancel = CancellationToken::new();
        let mut options = TurnOptions::default().with_cancel(cancel.clone());
        if !self.config.narrate {
            options = options.without_narration();
        }
        let request = ChatRequest::new(message).with_history(self.conversation.clone());

        let result = tokio::select! {
            result = self.use_case.execute(request, options) => result,
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                println!("{}", "(cancelled)".dimmed());
                return;
            }
        };

        match result {
            Ok(output) => {
                print!(
                    "{}",
                    self.formatter.format_reply(&output.response, &output.context)
                );
                if output.degraded {
                    println!("{}", "(answered without knowledge base context)".dimmed());
                }
                self.conversation.push(Turn::user(message));
                self.conversation.push(Turn::agent(output.response.reply));
                if output.narration.is_some() {
                    debug!("Narration running in background");
                }
            }
            Err(e) if e.is_cancelled() => {
                println!("{}", "(cancelled)".dimmed());
            }
            Err(e) => {
                print!("{}", self.formatter.format_error(&e.descriptor));
            }
        }
        println!();
    }
}
