//! ElevenLabs text-to-speech adapter

use super::credentials::require_api_key;
use super::http::{client_with_timeout, join_url, send, transport_error};
use async_trait::async_trait;
use mana_application::{ServiceError, SpeechAudio, SpeechPort};
use mana_domain::{AudioFormat, ElevenLabsProviderConfig};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

const SERVICE: &str = "elevenlabs";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
}

/// [`SpeechPort`] backed by `POST /v1/text-to-speech/{voice_id}`.
pub struct ElevenLabsSpeechAdapter {
    client: Client,
    config: ElevenLabsProviderConfig,
    format: AudioFormat,
}

impl ElevenLabsSpeechAdapter {
    pub fn new(config: ElevenLabsProviderConfig, timeout: Duration) -> Self {
        let format = AudioFormat::from_output_format(&config.output_format).unwrap_or_else(|| {
            warn!(
                "Unknown speech output format '{}', assuming MPEG",
                config.output_format
            );
            AudioFormat::Mpeg
        });
        Self {
            client: client_with_timeout(timeout),
            config,
            format,
        }
    }

    /// Format of the payloads this adapter returns.
    pub fn format(&self) -> AudioFormat {
        self.format
    }
}

#[async_trait]
impl SpeechPort for ElevenLabsSpeechAdapter {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio, ServiceError> {
        if text.trim().is_empty() {
            return Err(ServiceError::Validation("Text is required".to_string()));
        }
        let api_key = require_api_key(
            self.config.api_key.as_deref(),
            &self.config.api_key_env,
            "ElevenLabs",
        )?;

        let url = join_url(
            &self.config.base_url,
            &format!("/v1/text-to-speech/{}", self.config.voice_id),
        );
        let request = self
            .client
            .post(url)
            .query(&[("output_format", self.config.output_format.as_str())])
            .header("xi-api-key", api_key)
            .json(&SpeechRequest {
                text,
                model_id: &self.config.model_id,
                voice_settings: VoiceSettings {
                    stability: self.config.stability,
                    similarity_boost: self.config.similarity_boost,
                    style: self.config.style,
                },
            });

        let bytes = send(SERVICE, request)
            .await?
            .bytes()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        if bytes.is_empty() {
            return Err(ServiceError::MalformedResponse {
                service: SERVICE,
                reason: "empty audio payload".to_string(),
            });
        }
        debug!(bytes = bytes.len(), "Speech synthesized");

        Ok(SpeechAudio::new(bytes.to_vec(), self.format))
    }
}
