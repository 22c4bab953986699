//! Scripted port implementations shared by the use case tests.

use crate::ports::audio_output::{AudioOutputPort, PlaybackError};
use crate::ports::completion::CompletionPort;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::embedding::EmbeddingPort;
use crate::ports::observer::{NarrationObserver, TurnObserver};
use crate::ports::service_error::ServiceError;
use crate::ports::speech::{SpeechAudio, SpeechPort};
use crate::ports::vector_index::VectorIndexPort;
use async_trait::async_trait;
use mana_domain::{AudioBuffer, AudioFormat, NamespaceQuery, TurnPhase, VectorMatch};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub fn upstream_error(service: &'static str, status: u16) -> ServiceError {
    ServiceError::UpstreamStatus {
        service,
        status,
        body: format!("{{\"error\":\"raw {service} failure {status}\"}}"),
    }
}

pub fn text_match(text: &str, score: f32) -> VectorMatch {
    let mut metadata = serde_json::Map::new();
    metadata.insert("text".into(), json!(text));
    VectorMatch::new(score, metadata)
}

// ==================== Embedding ====================

pub struct MockEmbedding {
    pub result: Result<Vec<f32>, ServiceError>,
    pub calls: Mutex<Vec<String>>,
}

impl MockEmbedding {
    pub fn ok() -> Self {
        Self {
            result: Ok(vec![0.1, 0.2, 0.3]),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: ServiceError) -> Self {
        Self {
            result: Err(err),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl EmbeddingPort for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        self.calls.lock().unwrap().push(text.to_string());
        self.result.clone()
    }
}

// ==================== Vector index ====================

#[derive(Default)]
pub struct MockIndex {
    pub by_namespace: HashMap<String, Result<Vec<VectorMatch>, ServiceError>>,
    pub calls: Mutex<Vec<(String, usize)>>,
}

impl MockIndex {
    pub fn with(mut self, namespace: &str, result: Result<Vec<VectorMatch>, ServiceError>) -> Self {
        self.by_namespace.insert(namespace.to_string(), result);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl VectorIndexPort for MockIndex {
    async fn query(
        &self,
        vector: &[f32],
        query: &NamespaceQuery,
    ) -> Result<Vec<VectorMatch>, ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.namespace.as_str().to_string(), query.top_k));
        assert!(!vector.is_empty());
        self.by_namespace
            .get(query.namespace.as_str())
            .cloned()
            .unwrap_or(Ok(Vec::new()))
    }

    fn dimension(&self) -> usize {
        8
    }
}

// ==================== Completion ====================

pub struct MockCompletion {
    pub responses: Mutex<VecDeque<Result<String, ServiceError>>>,
    pub prompts: Mutex<Vec<(String, String)>>,
    pub delay: Option<Duration>,
}

impl MockCompletion {
    pub fn replying(text: &str) -> Self {
        Self::scripted(vec![Ok(text.to_string())])
    }

    pub fn failing(err: ServiceError) -> Self {
        Self::scripted(vec![Err(err)])
    }

    pub fn scripted(responses: Vec<Result<String, ServiceError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().unwrap().0.clone()
    }
}

#[async_trait]
impl CompletionPort for MockCompletion {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, ServiceError> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), system.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ServiceError::EmptyCompletion {
                service: "anthropic",
            }))
    }
}

// ==================== Speech ====================

pub struct MockSpeech {
    pub result: Result<SpeechAudio, ServiceError>,
    pub calls: AtomicUsize,
}

impl MockSpeech {
    /// Two samples of 16-bit PCM at 8 kHz.
    pub fn pcm() -> Self {
        Self {
            result: Ok(SpeechAudio::new(
                vec![0x00, 0x40, 0x00, 0xC0],
                AudioFormat::Pcm16 { sample_rate: 8_000 },
            )),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn returning(audio: SpeechAudio) -> Self {
        Self {
            result: Ok(audio),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: ServiceError) -> Self {
        Self {
            result: Err(err),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechPort for MockSpeech {
    async fn synthesize(&self, _text: &str) -> Result<SpeechAudio, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

// ==================== Audio output ====================

/// Records every buffer it is asked to play. With `hold` set, playback
/// lasts until cancelled.
#[derive(Default)]
pub struct RecordingSink {
    pub played: Mutex<Vec<AudioBuffer>>,
    pub cancelled: AtomicUsize,
    pub hold: bool,
    pub fail: Option<PlaybackError>,
}

impl RecordingSink {
    pub fn holding() -> Self {
        Self {
            hold: true,
            ..Self::default()
        }
    }

    pub fn play_count(&self) -> usize {
        self.played.lock().unwrap().len()
    }
}

#[async_trait]
impl AudioOutputPort for RecordingSink {
    async fn play(
        &self,
        buffer: AudioBuffer,
        cancel: CancellationToken,
    ) -> Result<(), PlaybackError> {
        self.played.lock().unwrap().push(buffer);
        if let Some(err) = &self.fail {
            return Err(err.clone());
        }
        if self.hold {
            cancel.cancelled().await;
            self.cancelled.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

// ==================== Observers / logger ====================

#[derive(Default)]
pub struct CountingNarrationObserver {
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
}

impl CountingNarrationObserver {
    pub fn counts(&self) -> (usize, usize) {
        (
            self.started.load(Ordering::SeqCst),
            self.stopped.load(Ordering::SeqCst),
        )
    }

    /// Whether the indicator is currently shown.
    pub fn is_narrating(&self) -> bool {
        let (started, stopped) = self.counts();
        started > stopped
    }
}

impl NarrationObserver for CountingNarrationObserver {
    fn on_narration_started(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_narration_stopped(&self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingTurnObserver {
    pub phases: Mutex<Vec<TurnPhase>>,
}

impl RecordingTurnObserver {
    pub fn phases(&self) -> Vec<TurnPhase> {
        self.phases.lock().unwrap().clone()
    }
}

impl TurnObserver for RecordingTurnObserver {
    fn on_phase(&self, phase: TurnPhase) {
        self.phases.lock().unwrap().push(phase);
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    pub events: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingLogger {
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type.to_string(), event.payload));
    }
}
