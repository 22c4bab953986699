//! Submit Chat Turn use case: the chat orchestrator.
//!
//! Sequences one user turn:
//!
//! ```text
//! validate → retrieve (degrades to empty) → aggregate → format → complete
//!          → return reply → narrate in the background (optional)
//! ```
//!
//! Exactly one of reply or error is produced per turn. Validation failures
//! touch no remote service. Retrieval failures never abort the turn.
//! Completion failures abort it with the generic user-facing message and
//! skip narration. Narration failures are logged and swallowed.

use crate::config::ChatParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::observer::{NoTurnObserver, TurnObserver};
use crate::ports::service_error::ServiceError;
use crate::use_cases::complete_reply::CompleteReplyUseCase;
use crate::use_cases::narrate::NarrationPipeline;
use crate::use_cases::retrieve_context::RetrieveContextUseCase;
use mana_domain::core::string::preview;
use mana_domain::{
    ChatMessage, ChatRequest, ChatResponse, ErrorDescriptor, RetrievalResult, TurnPhase,
    TurnState,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// A failed turn: the user-facing descriptor plus the underlying cause for
/// diagnostics.
#[derive(Error, Debug, Clone)]
#[error("{descriptor}")]
pub struct ChatTurnError {
    pub descriptor: ErrorDescriptor,
    pub cause: ServiceError,
}

impl ChatTurnError {
    fn new(cause: ServiceError) -> Self {
        Self {
            descriptor: cause.descriptor(),
            cause,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cause.is_cancelled()
    }
}

/// Per-turn options chosen by the caller.
#[derive(Debug, Clone)]
pub struct TurnOptions {
    /// Narrate the reply if a narration pipeline is configured.
    pub narrate: bool,
    /// Aborts in-flight upstream calls and any narration of this turn.
    pub cancel: CancellationToken,
}

impl Default for TurnOptions {
    fn default() -> Self {
        Self {
            narrate: true,
            cancel: CancellationToken::new(),
        }
    }
}

impl TurnOptions {
    pub fn without_narration(mut self) -> Self {
        self.narrate = false;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Handle on a background narration started after the reply was emitted.
#[derive(Debug)]
pub struct NarrationHandle {
    handle: JoinHandle<()>,
}

impl NarrationHandle {
    /// Wait for narration to end. Failures were already logged.
    pub async fn wait(self) {
        if let Err(e) = self.handle.await
            && e.is_panic()
        {
            error!("Narration task panicked: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Result of a successful turn.
#[derive(Debug)]
pub struct ChatTurnOutput {
    pub response: ChatResponse,
    /// Context that grounded the reply (empty when retrieval degraded).
    pub context: RetrievalResult,
    /// Whether retrieval failed and the turn proceeded without context.
    pub degraded: bool,
    pub narration: Option<NarrationHandle>,
}

/// Use case for running one chat turn end to end.
pub struct SubmitChatTurnUseCase {
    retrieve: RetrieveContextUseCase,
    complete: CompleteReplyUseCase,
    narration: Option<Arc<NarrationPipeline>>,
    observer: Arc<dyn TurnObserver>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl SubmitChatTurnUseCase {
    pub fn new(retrieve: RetrieveContextUseCase, complete: CompleteReplyUseCase) -> Self {
        Self {
            retrieve,
            complete,
            narration: None,
            observer: Arc::new(NoTurnObserver),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_narration(mut self, pipeline: Arc<NarrationPipeline>) -> Self {
        self.narration = Some(pipeline);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn TurnObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn params(&self) -> &ChatParams {
        self.retrieve.params()
    }

    pub fn narration(&self) -> Option<&Arc<NarrationPipeline>> {
        self.narration.as_ref()
    }

    /// Run one turn.
    pub async fn execute(
        &self,
        request: ChatRequest,
        options: TurnOptions,
    ) -> Result<ChatTurnOutput, ChatTurnError> {
        let state = Arc::new(Mutex::new(TurnState::new()));

        let message = match ChatMessage::parse(&request.message) {
            Ok(message) => message,
            Err(e) => {
                debug!("Rejected chat turn: {}", e);
                self.advance(&state, TurnPhase::Errored);
                return Err(ChatTurnError::new(ServiceError::Validation(e.to_string())));
            }
        };

        info!("Chat turn: {}", preview(message.content(), 100));
        self.conversation_logger.log(ConversationEvent::new(
            "chat_request",
            json!({
                "message": message.content(),
                "history_turns": request.history.len(),
            }),
        ));

        let start = Instant::now();
        let turn = self.run(&state, message.content(), &request);
        let result = tokio::select! {
            _ = options.cancel.cancelled() => Err(ServiceError::Cancelled),
            result = turn => result,
        };

        let (reply, context, degraded) = match result {
            Ok(done) => done,
            Err(cause) => {
                self.advance(&state, TurnPhase::Errored);
                if cause.is_cancelled() {
                    info!("Chat turn cancelled");
                } else {
                    error!("Chat turn failed: {}", cause);
                }
                return Err(ChatTurnError::new(cause));
            }
        };
        info!(
            "Chat turn answered in {} ms (context: {}, degraded: {})",
            start.elapsed().as_millis(),
            context.len(),
            degraded
        );

        let narration = match (&self.narration, options.narrate) {
            (Some(pipeline), true) => {
                self.advance(&state, TurnPhase::Narrating);
                Some(self.spawn_narration(pipeline.clone(), reply.clone(), state, &options.cancel))
            }
            _ => {
                self.advance(&state, TurnPhase::Done);
                None
            }
        };

        Ok(ChatTurnOutput {
            response: ChatResponse { reply },
            context,
            degraded,
            narration,
        })
    }

    async fn run(
        &self,
        state: &Mutex<TurnState>,
        message: &str,
        request: &ChatRequest,
    ) -> Result<(String, RetrievalResult, bool), ServiceError> {
        let history = request.history.turns();

        self.advance(state, TurnPhase::Retrieving);
        let (context, degraded) = match self.retrieve.execute(message, history).await {
            Ok(context) => (context, false),
            Err(e) => {
                warn!("Retrieval failed, continuing without context: {}", e);
                self.conversation_logger.log(ConversationEvent::new(
                    "retrieval_degraded",
                    json!({ "error": e.to_string() }),
                ));
                (RetrievalResult::empty(), true)
            }
        };

        self.advance(state, TurnPhase::Completing);
        let reply = self
            .complete
            .execute(message, history, &context.context_text())
            .await?;

        Ok((reply, context, degraded))
    }

    fn spawn_narration(
        &self,
        pipeline: Arc<NarrationPipeline>,
        reply: String,
        state: Arc<Mutex<TurnState>>,
        cancel: &CancellationToken,
    ) -> NarrationHandle {
        let observer = self.observer.clone();
        let cancel = cancel.child_token();
        let handle = tokio::spawn(async move {
            // Failures are logged by the pipeline; the reply stands regardless.
            let _ = pipeline.narrate(&reply, &cancel).await;
            if let Ok(mut state) = state.lock()
                && state.advance(TurnPhase::Done).is_ok()
            {
                observer.on_phase(TurnPhase::Done);
            }
        });
        NarrationHandle { handle }
    }

    fn advance(&self, state: &Mutex<TurnState>, next: TurnPhase) {
        let advanced = match state.lock() {
            Ok(mut state) => state.advance(next),
            Err(_) => return,
        };
        match advanced {
            Ok(phase) => self.observer.on_phase(phase),
            Err(e) => warn!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::*;
    use mana_domain::{AudioBuffer, Conversation, ErrorKind, GENERIC_FAILURE_MESSAGE, Turn};
    use std::time::Duration;

    struct Harness {
        embedding: Arc<MockEmbedding>,
        index: Arc<MockIndex>,
        completion: Arc<MockCompletion>,
        speech: Arc<MockSpeech>,
        sink: Arc<RecordingSink>,
        narration_observer: Arc<CountingNarrationObserver>,
        turn_observer: Arc<RecordingTurnObserver>,
        use_case: SubmitChatTurnUseCase,
    }

    fn harness(
        embedding: MockEmbedding,
        index: MockIndex,
        completion: MockCompletion,
        speech: MockSpeech,
    ) -> Harness {
        let embedding = Arc::new(embedding);
        let index = Arc::new(index);
        let completion = Arc::new(completion);
        let speech = Arc::new(speech);
        let sink = Arc::new(RecordingSink::default());
        let narration_observer = Arc::new(CountingNarrationObserver::default());
        let turn_observer = Arc::new(RecordingTurnObserver::default());

        let pipeline = NarrationPipeline::new(
            speech.clone(),
            sink.clone(),
            AudioBuffer::mono(8_000, vec![1.0]),
        )
        .with_observer(narration_observer.clone());

        let use_case = SubmitChatTurnUseCase::new(
            RetrieveContextUseCase::new(embedding.clone(), index.clone()),
            CompleteReplyUseCase::new(completion.clone()),
        )
        .with_narration(Arc::new(pipeline))
        .with_observer(turn_observer.clone());

        Harness {
            embedding,
            index,
            completion,
            speech,
            sink,
            narration_observer,
            turn_observer,
            use_case,
        }
    }

    fn six_matches() -> MockIndex {
        MockIndex::default()
            .with("MANA", Ok(vec![text_match("alpha", 0.9), text_match("delta", 0.3)]))
            .with("knowledge", Ok(vec![text_match("beta", 0.7), text_match("eps", 0.2)]))
            .with("backrooms", Ok(vec![text_match("gamma", 0.5), text_match("zeta", 0.1)]))
    }

    #[tokio::test]
    async fn test_full_turn_with_narration() {
        let h = harness(
            MockEmbedding::ok(),
            six_matches(),
            MockCompletion::replying("The seeds remember."),
            MockSpeech::pcm(),
        );

        let output = h
            .use_case
            .execute(ChatRequest::new("What is MANA?"), TurnOptions::default())
            .await
            .unwrap();

        assert_eq!(output.response.reply, "The seeds remember.");
        assert!(!output.degraded);
        let scores: Vec<f32> = output.context.snippets().iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![0.9, 0.7, 0.5, 0.3, 0.2]);
        let prompt = h.completion.last_prompt();
        assert!(prompt.contains("Context:\nalpha\nbeta\ngamma\ndelta\neps\n\n"));
        assert!(!prompt.contains("zeta"));

        output.narration.unwrap().wait().await;
        assert_eq!(h.sink.play_count(), 1);
        assert_eq!(h.narration_observer.counts(), (1, 1));
        assert_eq!(
            h.turn_observer.phases(),
            vec![
                TurnPhase::Retrieving,
                TurnPhase::Completing,
                TurnPhase::Narrating,
                TurnPhase::Done
            ]
        );
    }

    #[tokio::test]
    async fn test_unreachable_retrieval_degrades_to_empty_context() {
        let h = harness(
            MockEmbedding::failing(ServiceError::Transport {
                service: "openai",
                reason: "connection refused".into(),
            }),
            MockIndex::default(),
            MockCompletion::replying("Still here."),
            MockSpeech::pcm(),
        );

        let output = h
            .use_case
            .execute(
                ChatRequest::new("What is MANA?"),
                TurnOptions::default().without_narration(),
            )
            .await
            .unwrap();

        assert_eq!(output.response.reply, "Still here.");
        assert!(output.degraded);
        assert!(output.context.is_empty());
        assert!(!h.completion.last_prompt().contains("Context:"));
        assert!(output.narration.is_none());
    }

    #[tokio::test]
    async fn test_missing_retrieval_credential_still_degrades() {
        let h = harness(
            MockEmbedding::failing(ServiceError::Config("OpenAI API key not configured".into())),
            MockIndex::default(),
            MockCompletion::replying("ok"),
            MockSpeech::pcm(),
        );

        let output = h
            .use_case
            .execute(ChatRequest::new("hi"), TurnOptions::default().without_narration())
            .await
            .unwrap();
        assert!(output.degraded);
    }

    #[tokio::test]
    async fn test_empty_message_makes_no_network_calls() {
        for message in ["", "   ", "\n\t"] {
            let h = harness(
                MockEmbedding::ok(),
                six_matches(),
                MockCompletion::replying("unused"),
                MockSpeech::pcm(),
            );

            let err = h
                .use_case
                .execute(ChatRequest::new(message), TurnOptions::default())
                .await
                .unwrap_err();

            assert_eq!(err.descriptor.kind, ErrorKind::Validation);
            assert_eq!(err.descriptor.message, "Message is required");
            assert_eq!(h.embedding.call_count(), 0);
            assert_eq!(h.index.call_count(), 0);
            assert_eq!(h.completion.call_count(), 0);
            assert_eq!(h.speech.call_count(), 0);
            assert_eq!(h.turn_observer.phases(), vec![TurnPhase::Errored]);
        }
    }

    #[tokio::test]
    async fn test_completion_401_yields_generic_error_and_no_narration() {
        let h = harness(
            MockEmbedding::ok(),
            six_matches(),
            MockCompletion::failing(upstream_error("anthropic", 401)),
            MockSpeech::pcm(),
        );

        let err = h
            .use_case
            .execute(ChatRequest::new("What is MANA?"), TurnOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.descriptor.kind, ErrorKind::Upstream);
        assert_eq!(err.descriptor.message, GENERIC_FAILURE_MESSAGE);
        assert!(!err.to_string().contains("401"));
        assert!(matches!(err.cause, ServiceError::UpstreamStatus { status: 401, .. }));
        assert_eq!(h.speech.call_count(), 0);
        assert_eq!(h.narration_observer.counts(), (0, 0));
        assert_eq!(h.turn_observer.phases().last(), Some(&TurnPhase::Errored));
    }

    #[tokio::test]
    async fn test_completion_config_error_surfaces_descriptive_message() {
        let h = harness(
            MockEmbedding::ok(),
            six_matches(),
            MockCompletion::failing(ServiceError::Config(
                "Anthropic API key not configured".into(),
            )),
            MockSpeech::pcm(),
        );

        let err = h
            .use_case
            .execute(ChatRequest::new("hi"), TurnOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.descriptor.kind.status_code(), 500);
        assert_eq!(err.descriptor.message, "Anthropic API key not configured");
    }

    #[tokio::test]
    async fn test_speech_failure_keeps_reply() {
        let h = harness(
            MockEmbedding::ok(),
            six_matches(),
            MockCompletion::replying("The reply stands."),
            MockSpeech::failing(upstream_error("elevenlabs", 500)),
        );

        let output = h
            .use_case
            .execute(ChatRequest::new("hi"), TurnOptions::default())
            .await
            .unwrap();
        output.narration.unwrap().wait().await;

        assert_eq!(output.response.reply, "The reply stands.");
        assert_eq!(h.narration_observer.counts(), (1, 1));
        assert!(!h.narration_observer.is_narrating());
        assert_eq!(h.turn_observer.phases().last(), Some(&TurnPhase::Done));
    }

    #[tokio::test]
    async fn test_history_reaches_prompt_and_embedding() {
        let h = harness(
            MockEmbedding::ok(),
            MockIndex::default(),
            MockCompletion::replying("ok"),
            MockSpeech::pcm(),
        );
        let history: Conversation = vec![Turn::user("hello"), Turn::agent("moo")].into();

        h.use_case
            .execute(
                ChatRequest::new("and TREE?").with_history(history),
                TurnOptions::default().without_narration(),
            )
            .await
            .unwrap();

        assert_eq!(h.embedding.calls.lock().unwrap()[0], "hello moo and TREE?");
        assert!(
            h.completion
                .last_prompt()
                .contains("Previous conversation:\nUser: hello\n\nAssistant: moo\n\n")
        );
    }

    #[tokio::test]
    async fn test_cancellation_aborts_in_flight_completion() {
        let h = harness(
            MockEmbedding::ok(),
            MockIndex::default(),
            MockCompletion::replying("late").with_delay(Duration::from_secs(30)),
            MockSpeech::pcm(),
        );
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = h
            .use_case
            .execute(
                ChatRequest::new("hi"),
                TurnOptions::default().with_cancel(cancel),
            )
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(h.speech.call_count(), 0);
    }
}
