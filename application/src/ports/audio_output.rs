//! Audio output port
//!
//! The narration pipeline renders its mix graph offline and hands the
//! resulting stereo buffer to an [`AudioOutputPort`]. Implementations live in
//! the infrastructure layer (device playback, WAV file, null sink); tests
//! inject recording sinks.

use async_trait::async_trait;
use mana_domain::AudioBuffer;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Output device error: {0}")]
    Device(String),

    #[error("I/O error: {0}")]
    Io(String),
}

#[async_trait]
pub trait AudioOutputPort: Send + Sync {
    /// Play `buffer`, resolving when playback ends naturally or `cancel`
    /// fires. Cancellation is not an error.
    async fn play(&self, buffer: AudioBuffer, cancel: CancellationToken)
    -> Result<(), PlaybackError>;
}
