//! CLI entrypoint for mana-chat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use mana_application::{
    AudioOutputPort, CompleteReplyUseCase, ConversationLogger, NarrationObserver,
    NarrationPipeline, NoConversationLogger, NoTurnObserver, RetrieveContextUseCase,
    SampleConceptUseCase, SpeechPort, SubmitChatTurnUseCase, TurnObserver, TurnOptions,
};
use mana_domain::{ChatRequest, ConfigIssue, OutputFormat, Severity};
use mana_infrastructure::{
    AnthropicCompletionAdapter, ConfigLoader, ElevenLabsSpeechAdapter, FileConfig,
    JsonlConversationLogger, NarrationOutput, NullAudioSink, OpenAiEmbeddingAdapter,
    PineconeIndexAdapter, WavFileSink, load_impulse,
};
use mana_presentation::{
    AppState, ChatRepl, Cli, NarrationIndicator, ReplConfig, TurnProgressReporter,
    formatter_for, start_server,
};
use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Kept alive until exit so buffered file logs are flushed
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref())?;

    info!("Starting mana-chat");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
    }
    .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

    report_config_issues(&config.validate())?;

    if !config.output.color || cli.json {
        colored::control::set_override(false);
    }

    let conversation_logger = conversation_logger(&config);

    // === Dependency Injection ===
    let providers = config.providers.to_provider_config();
    let timeouts = config.chat.to_timeouts();
    let params = config.chat.to_chat_params();

    let embedding = Arc::new(OpenAiEmbeddingAdapter::new(
        providers.openai,
        timeouts.embedding,
    ));
    let index = Arc::new(PineconeIndexAdapter::new(
        providers.pinecone,
        timeouts.vector_query,
    ));
    let completion = Arc::new(AnthropicCompletionAdapter::new(
        providers.anthropic,
        timeouts.completion,
    ));
    let speech: Arc<dyn SpeechPort> = Arc::new(ElevenLabsSpeechAdapter::new(
        providers.elevenlabs,
        timeouts.speech,
    ));

    let retrieve = RetrieveContextUseCase::new(embedding, index.clone())
        .with_params(params.clone())
        .with_conversation_logger(conversation_logger.clone());
    let complete = CompleteReplyUseCase::new(completion)
        .with_max_prompt_turns(params.max_prompt_turns)
        .with_conversation_logger(conversation_logger.clone());

    // Server mode
    if cli.serve {
        let addr: SocketAddr = match &cli.bind {
            Some(bind) => bind
                .parse()
                .with_context(|| format!("Invalid bind address '{}'", bind))?,
            None => config
                .server
                .parse_bind()
                .map_err(|issue| anyhow!(issue.message))?,
        };
        let state = AppState::new(retrieve, complete, speech)
            .with_conversation_logger(conversation_logger);
        start_server(addr, state, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Proxy server failed")?;
        return Ok(ExitCode::SUCCESS);
    }

    let interactive_output = !cli.quiet && !cli.json;
    let indicator = Arc::new(if cli.chat || !interactive_output {
        NarrationIndicator::silent()
    } else {
        NarrationIndicator::spinner()
    });
    let turn_observer: Arc<dyn TurnObserver> =
        if interactive_output && (!cli.chat || config.repl.show_progress) {
            Arc::new(TurnProgressReporter::new())
        } else {
            Arc::new(NoTurnObserver)
        };

    let mut use_case = SubmitChatTurnUseCase::new(retrieve, complete)
        .with_observer(turn_observer)
        .with_conversation_logger(conversation_logger.clone());
    if !cli.no_narration
        && let Some(pipeline) = build_narration(
            &config,
            speech,
            indicator.clone(),
            conversation_logger,
        )?
    {
        use_case = use_case.with_narration(Arc::new(pipeline));
    }
    let use_case = Arc::new(use_case);

    // Chat mode
    if cli.chat {
        let repl_config = ReplConfig {
            show_progress: config.repl.show_progress && !cli.quiet,
            history_file: config.repl.history_path(),
            narrate: use_case.narration().is_some(),
        };
        let mut repl = ChatRepl::new(use_case)
            .with_sampler(SampleConceptUseCase::new(index))
            .with_indicator(indicator)
            .with_config(repl_config);

        repl.run().await?;
        return Ok(ExitCode::SUCCESS);
    }

    // Single message mode - message is required
    let message = match cli.question {
        Some(q) => q,
        None => bail!("A message is required. Use --chat for interactive mode or --serve for the proxy."),
    };

    let format = if cli.json {
        OutputFormat::Json
    } else {
        config.output.format.unwrap_or_default()
    };
    let formatter = formatter_for(format, cli.verbose > 0);

    let cancel = CancellationToken::new();
    let options = TurnOptions::default().with_cancel(cancel.clone());
    let result = tokio::select! {
        result = use_case.execute(ChatRequest::new(message), options) => result,
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            eprintln!("Interrupted");
            return Ok(ExitCode::from(130));
        }
    };

    match result {
        Ok(output) => {
            println!(
                "{}",
                formatter.format_reply(&output.response, &output.context)
            );
            if let Some(narration) = output.narration {
                let wait = narration.wait();
                tokio::pin!(wait);
                tokio::select! {
                    _ = &mut wait => {}
                    _ = tokio::signal::ctrl_c() => {
                        cancel.cancel();
                        wait.await;
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{}", formatter.format_error(&e.descriptor));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Console logs on stderr, plus daily-rolling files when `log_dir` is set.
///
/// `RUST_LOG` overrides the level derived from `-v`.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let Some(dir) = log_dir else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .init();
        return Ok(None);
    };

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("mana-chat")
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("Cannot write logs to {}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    Ok(Some(guard))
}

/// Print configuration issues; fail if any is an error.
fn report_config_issues(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        match issue.severity {
            Severity::Error => eprintln!("{} {}", "Config error:".red().bold(), issue.message),
            Severity::Warning => {
                eprintln!("{} {}", "Config warning:".yellow().bold(), issue.message)
            }
        }
    }
    if ConfigIssue::has_errors(issues) {
        bail!("Invalid configuration");
    }
    Ok(())
}

fn conversation_logger(config: &FileConfig) -> Arc<dyn ConversationLogger> {
    let logger = config
        .logging
        .conversation_dir()
        .and_then(JsonlConversationLogger::in_dir);
    match logger {
        Some(logger) => {
            info!("Conversation log: {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    }
}

fn build_narration(
    config: &FileConfig,
    speech: Arc<dyn SpeechPort>,
    observer: Arc<dyn NarrationObserver>,
    logger: Arc<dyn ConversationLogger>,
) -> Result<Option<NarrationPipeline>> {
    let params = config.narration.to_params();
    if !params.enabled {
        return Ok(None);
    }

    let impulse = load_impulse(config.narration.impulse_path().as_deref())?;
    let (output, _) = config.narration.parse_output();
    let sink: Arc<dyn AudioOutputPort> = match output {
        NarrationOutput::Device => device_sink(),
        NarrationOutput::Wav => Arc::new(WavFileSink::new(config.narration.wav_dir())),
        NarrationOutput::None => Arc::new(NullAudioSink),
    };

    Ok(Some(
        NarrationPipeline::new(speech, sink, impulse)
            .with_mix(params.mix)
            .with_observer(observer)
            .with_conversation_logger(logger),
    ))
}

#[cfg(feature = "playback")]
fn device_sink() -> Arc<dyn AudioOutputPort> {
    Arc::new(mana_infrastructure::CpalAudioSink::new())
}

#[cfg(not(feature = "playback"))]
fn device_sink() -> Arc<dyn AudioOutputPort> {
    tracing::warn!("Built without the `playback` feature; narration audio is discarded (set narration.output = \"wav\" to keep it)");
    Arc::new(NullAudioSink)
}
