//! Speech synthesis port

use super::service_error::ServiceError;
use async_trait::async_trait;
use mana_domain::AudioFormat;

/// A synthesized audio payload as returned by the speech service.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

impl SpeechAudio {
    pub fn new(bytes: Vec<u8>, format: AudioFormat) -> Self {
        Self { bytes, format }
    }
}

#[async_trait]
pub trait SpeechPort: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio, ServiceError>;
}
