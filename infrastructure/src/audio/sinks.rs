//! File and null audio sinks

use async_trait::async_trait;
use mana_application::{AudioOutputPort, PlaybackError};
use mana_domain::AudioBuffer;
use mana_domain::audio::encode_wav;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Discards every buffer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudioSink;

#[async_trait]
impl AudioOutputPort for NullAudioSink {
    async fn play(
        &self,
        buffer: AudioBuffer,
        _cancel: CancellationToken,
    ) -> Result<(), PlaybackError> {
        debug!(
            "Discarding {:.2}s of narration audio",
            buffer.duration().as_secs_f32()
        );
        Ok(())
    }
}

/// Writes each narration to `narration-<timestamp>-<n>.wav` in a directory.
pub struct WavFileSink {
    dir: PathBuf,
    counter: AtomicU64,
}

impl WavFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_path(&self) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        self.dir.join(format!("narration-{}-{}.wav", stamp, n))
    }
}

#[async_trait]
impl AudioOutputPort for WavFileSink {
    async fn play(&self, buffer: AudioBuffer, cancel: CancellationToken) -> Result<(), PlaybackError> {
        if cancel.is_cancelled() {
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PlaybackError::Io(format!("{}: {}", self.dir.display(), e)))?;

        let path = self.next_path();
        let bytes = encode_wav(&buffer);
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Narration file write cancelled");
                discard_partial(&path).await;
                Ok(())
            }
            result = tokio::fs::write(&path, &bytes) => {
                result.map_err(|e| PlaybackError::Io(format!("{}: {}", path.display(), e)))?;
                info!("Narration written to {}", path.display());
                Ok(())
            }
        }
    }
}

/// Remove a file whose write was interrupted.
async fn discard_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial narration file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove partial narration file {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mana_domain::audio::decode_wav;

    fn stereo() -> AudioBuffer {
        AudioBuffer::from_stereo_planes(8_000, &[0.5, -0.5], &[0.25, -0.25])
    }

    #[tokio::test]
    async fn test_null_sink_accepts_everything() {
        NullAudioSink
            .play(stereo(), CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wav_sink_writes_decodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = WavFileSink::new(dir.path().join("out"));

        sink.play(stereo(), CancellationToken::new()).await.unwrap();
        sink.play(stereo(), CancellationToken::new()).await.unwrap();

        let mut files: Vec<_> = std::fs::read_dir(sink.dir())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        files.sort();
        assert_eq!(files.len(), 2);

        let decoded = decode_wav(&std::fs::read(&files[0]).unwrap()).unwrap();
        assert_eq!(decoded.channels(), 2);
        assert_eq!(decoded.frames(), 2);
        assert_eq!(decoded.sample_rate(), 8_000);
    }

    #[tokio::test]
    async fn test_wav_sink_skips_cancelled_narration() {
        let dir = tempfile::tempdir().unwrap();
        let sink = WavFileSink::new(dir.path());
        let cancel = CancellationToken::new();
        cancel.cancel();

        sink.play(stereo(), cancel).await.unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unwritable_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let sink = WavFileSink::new(blocker.join("nested"));

        let err = sink.play(stereo(), CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, PlaybackError::Io(_)));
    }

    #[tokio::test]
    async fn test_interrupted_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("narration-partial.wav");
        std::fs::write(&partial, b"RIFF").unwrap();

        discard_partial(&partial).await;
        discard_partial(&partial).await;

        assert!(!partial.exists());
    }
}
