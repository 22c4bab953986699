//! Narration pipeline.
//!
//! Speaks a reply that has already been delivered:
//!
//! 1. request synthesized audio from the speech service
//! 2. decode the payload into an [`AudioBuffer`]
//! 3. render it through the dry/wet [`MixGraph`]
//! 4. hand the stereo result to the audio output
//!
//! Every run owns one [`NarrationSession`]. The session signals "started"
//! when it is created and "stopped" exactly once when it is torn down,
//! whichever of completion, failure, cancellation or replacement by a newer
//! session happens first. Only one session is active per pipeline.

use crate::ports::audio_output::{AudioOutputPort, PlaybackError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::observer::{NarrationObserver, NoNarrationObserver};
use crate::ports::service_error::ServiceError;
use crate::ports::speech::SpeechPort;
use mana_domain::audio::codec;
use mana_domain::{AudioBuffer, DomainError, MixGraph, MixSettings};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum NarrationError {
    #[error("Speech synthesis failed: {0}")]
    Speech(#[from] ServiceError),

    #[error("Audio error: {0}")]
    Audio(#[from] DomainError),

    #[error("Playback failed: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Narration cancelled")]
    Cancelled,
}

/// Why a session was torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Completed,
    Failed,
    Cancelled,
    Replaced,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Completed => "completed",
            StopReason::Failed => "failed",
            StopReason::Cancelled => "cancelled",
            StopReason::Replaced => "replaced",
        }
    }
}

/// Summary of a finished narration.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationOutcome {
    pub session_id: u64,
    pub audio_duration: Duration,
}

/// One narration's exclusively owned resources.
///
/// Holds the mix graph, the decoded buffer (once available) and the
/// cancellation token wired to playback. [`teardown`](Self::teardown)
/// releases all of them and notifies the observer; it only ever acts once.
pub struct NarrationSession {
    id: u64,
    graph: MixGraph,
    buffer: Mutex<Option<AudioBuffer>>,
    cancel: CancellationToken,
    torn_down: AtomicBool,
    observer: Arc<dyn NarrationObserver>,
}

impl NarrationSession {
    fn start(
        id: u64,
        graph: MixGraph,
        cancel: CancellationToken,
        observer: Arc<dyn NarrationObserver>,
    ) -> Self {
        observer.on_narration_started();
        Self {
            id,
            graph,
            buffer: Mutex::new(None),
            cancel,
            torn_down: AtomicBool::new(false),
            observer,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        !self.torn_down.load(Ordering::SeqCst)
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    fn attach(&self, buffer: AudioBuffer) {
        if let Ok(mut slot) = self.buffer.lock() {
            *slot = Some(buffer);
        }
    }

    /// Release the session's resources. Returns `false` if it was already
    /// torn down.
    pub fn teardown(&self, reason: StopReason) -> bool {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.cancel.cancel();
        if let Ok(mut slot) = self.buffer.lock() {
            slot.take();
        }
        debug!(session = self.id, reason = reason.as_str(), "Narration session torn down");
        self.observer.on_narration_stopped();
        true
    }
}

impl Drop for NarrationSession {
    fn drop(&mut self) {
        self.teardown(StopReason::Cancelled);
    }
}

/// Use case for narrating reply text.
pub struct NarrationPipeline {
    speech: Arc<dyn SpeechPort>,
    output: Arc<dyn AudioOutputPort>,
    impulse: Arc<AudioBuffer>,
    mix: MixSettings,
    observer: Arc<dyn NarrationObserver>,
    conversation_logger: Arc<dyn ConversationLogger>,
    active: Mutex<Option<Arc<NarrationSession>>>,
    next_id: AtomicU64,
}

impl NarrationPipeline {
    pub fn new(
        speech: Arc<dyn SpeechPort>,
        output: Arc<dyn AudioOutputPort>,
        impulse: AudioBuffer,
    ) -> Self {
        Self {
            speech,
            output,
            impulse: Arc::new(impulse),
            mix: MixSettings::default(),
            observer: Arc::new(NoNarrationObserver),
            conversation_logger: Arc::new(NoConversationLogger),
            active: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_mix(mut self, mix: MixSettings) -> Self {
        self.mix = mix;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn NarrationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Whether a session is currently playing or preparing.
    pub fn is_narrating(&self) -> bool {
        self.active
            .lock()
            .map(|slot| slot.as_ref().is_some_and(|s| s.is_active()))
            .unwrap_or(false)
    }

    /// Tear down the active session, if any.
    pub fn stop(&self) {
        let previous = self.active.lock().ok().and_then(|mut slot| slot.take());
        if let Some(session) = previous {
            session.teardown(StopReason::Cancelled);
        }
    }

    /// Open a new session, tearing down the one it replaces.
    fn begin(&self, parent: &CancellationToken) -> Arc<NarrationSession> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let previous = self.active.lock().ok().and_then(|mut slot| slot.take());
        if let Some(previous) = previous {
            info!(
                replaced = previous.id(),
                session = id,
                "Replacing active narration"
            );
            previous.teardown(StopReason::Replaced);
        }

        let session = Arc::new(NarrationSession::start(
            id,
            MixGraph::narration(&self.mix),
            parent.child_token(),
            self.observer.clone(),
        ));
        if let Ok(mut slot) = self.active.lock() {
            *slot = Some(session.clone());
        }
        session
    }

    fn finish(&self, session: &Arc<NarrationSession>, reason: StopReason) {
        session.teardown(reason);
        if let Ok(mut slot) = self.active.lock()
            && slot.as_ref().is_some_and(|s| Arc::ptr_eq(s, session))
        {
            slot.take();
        }
    }

    /// Narrate `text`. Resolves when playback ends, fails or is cancelled.
    pub async fn narrate(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<NarrationOutcome, NarrationError> {
        let session = self.begin(cancel);
        let start = Instant::now();

        let result = self.run(&session, text).await;

        let reason = match &result {
            Ok(_) => StopReason::Completed,
            Err(NarrationError::Cancelled) => StopReason::Cancelled,
            Err(_) => StopReason::Failed,
        };
        self.finish(&session, reason);

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(outcome) => info!(
                session = session.id(),
                audio_ms = outcome.audio_duration.as_millis() as u64,
                "Narration finished"
            ),
            Err(e) => warn!(session = session.id(), "Narration ended: {}", e),
        }
        self.conversation_logger.log(ConversationEvent::new(
            "narration",
            json!({
                "session": session.id(),
                "outcome": reason.as_str(),
                "error": result.as_ref().err().map(|e| e.to_string()),
                "text_chars": text.len(),
                "duration_ms": duration_ms,
            }),
        ));

        result
    }

    async fn run(
        &self,
        session: &NarrationSession,
        text: &str,
    ) -> Result<NarrationOutcome, NarrationError> {
        let cancel = session.cancel_token().clone();

        let audio = tokio::select! {
            _ = cancel.cancelled() => return Err(NarrationError::Cancelled),
            audio = self.speech.synthesize(text) => audio?,
        };
        debug!(
            session = session.id(),
            bytes = audio.bytes.len(),
            content_type = audio.format.content_type(),
            "Speech received"
        );

        let decoded = codec::decode(&audio.bytes, audio.format)?;
        let audio_duration = decoded.duration();
        let mixed = session.graph.render(&decoded, &self.impulse)?;
        session.attach(decoded);

        if cancel.is_cancelled() {
            return Err(NarrationError::Cancelled);
        }

        self.output.play(mixed, cancel.clone()).await?;

        if cancel.is_cancelled() {
            return Err(NarrationError::Cancelled);
        }

        Ok(NarrationOutcome {
            session_id: session.id(),
            audio_duration,
        })
    }
}
