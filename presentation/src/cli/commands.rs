//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for mana-chat
#[derive(Parser, Debug)]
#[command(name = "mana-chat")]
#[command(author, version, about = "Chat with MANA, grounded in the MANA knowledge base")]
#[command(long_about = r#"
mana-chat answers questions as MANA, the mystical cow of the digital seeds.

Each turn runs in three steps:
1. Retrieval: the message (plus recent history) is embedded and the
   MANA, knowledge and backrooms namespaces are searched
2. Completion: the five best snippets are woven into the prompt
3. Narration: the reply is spoken with a touch of reverb (optional)

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./mana.toml         Project-level config
3. ~/.config/mana-chat/config.toml   Global config
Environment variables MANA_* override all files
(e.g. MANA_NARRATION__ENABLED=false).

Example:
  mana-chat "What is MANA?"
  mana-chat --json --no-narration "Tell me about TREE"
  mana-chat --chat
  mana-chat --serve
"#)]
pub struct Cli {
    /// The message to send (not required in chat or serve mode)
    pub question: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long, conflicts_with = "serve")]
    pub chat: bool,

    /// Run the HTTP proxy server
    #[arg(long)]
    pub serve: bool,

    /// Address for the HTTP proxy server (overrides [server].bind)
    #[arg(long, value_name = "ADDR", requires = "serve")]
    pub bind: Option<String>,

    /// Print the reply as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not narrate replies
    #[arg(long)]
    pub no_narration: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write operation logs to daily files in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
