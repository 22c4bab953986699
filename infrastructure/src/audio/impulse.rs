//! Reverb impulse responses
//!
//! Loaded once at startup. A configured WAV file is decoded as-is; without
//! one a short synthetic room (exponentially decaying noise from a fixed
//! seed) is generated so renders stay reproducible.

use mana_domain::AudioBuffer;
use mana_domain::DomainError;
use mana_domain::audio::decode_wav;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Sample rate of the synthetic impulse.
pub const SYNTHETIC_SAMPLE_RATE: u32 = 24_000;

const SYNTHETIC_SECONDS: f32 = 1.5;
const SYNTHETIC_DECAY: f32 = 3.0;
const SYNTHETIC_SEED: u64 = 0x4D41_4E41;

#[derive(Error, Debug)]
pub enum ImpulseError {
    #[error("Failed to read impulse response {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid impulse response {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DomainError,
    },
}

/// Load the impulse at `path`, or synthesize one when `path` is `None`.
pub fn load_impulse(path: Option<&Path>) -> Result<AudioBuffer, ImpulseError> {
    let Some(path) = path else {
        return Ok(synthetic_impulse(SYNTHETIC_SAMPLE_RATE, SYNTHETIC_SEED));
    };

    let bytes = std::fs::read(path).map_err(|source| ImpulseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let buffer = decode_wav(&bytes).map_err(|source| ImpulseError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    if buffer.is_empty() {
        return Err(ImpulseError::Decode {
            path: path.to_path_buf(),
            source: DomainError::AudioDecode("impulse response has no samples".to_string()),
        });
    }

    info!(
        "Loaded impulse response {} ({} Hz, {} ch, {:.2}s)",
        path.display(),
        buffer.sample_rate(),
        buffer.channels(),
        buffer.duration().as_secs_f32()
    );
    Ok(buffer)
}

/// Stereo decaying noise, deterministic for a given seed.
pub fn synthetic_impulse(sample_rate: u32, seed: u64) -> AudioBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    let len = ((sample_rate as f32) * SYNTHETIC_SECONDS) as usize;

    let mut left = Vec::with_capacity(len);
    let mut right = Vec::with_capacity(len);
    for i in 0..len {
        let envelope = (1.0 - i as f32 / len as f32).powf(SYNTHETIC_DECAY);
        left.push(rng.random_range(-1.0f32..=1.0) * envelope);
        right.push(rng.random_range(-1.0f32..=1.0) * envelope);
    }

    AudioBuffer::from_stereo_planes(sample_rate, &left, &right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mana_domain::audio::encode_wav;

    #[test]
    fn test_synthetic_impulse_is_deterministic() {
        let a = synthetic_impulse(8_000, 7);
        let b = synthetic_impulse(8_000, 7);
        assert_eq!(a, b);
        assert_eq!(a.channels(), 2);
        assert_eq!(a.frames(), 12_000);
    }

    #[test]
    fn test_synthetic_impulse_decays() {
        let ir = synthetic_impulse(8_000, 1);
        let mono = ir.to_mono();
        let head: f32 = mono[..1_000].iter().map(|s| s.abs()).sum();
        let tail: f32 = mono[mono.len() - 1_000..].iter().map(|s| s.abs()).sum();
        assert!(head > tail * 10.0);
    }

    #[test]
    fn test_default_is_synthetic() {
        let ir = load_impulse(None).unwrap();
        assert_eq!(ir.sample_rate(), SYNTHETIC_SAMPLE_RATE);
    }

    #[test]
    fn test_load_wav_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("room.wav");
        let original = AudioBuffer::mono(16_000, vec![1.0, 0.5, 0.25, 0.0]);
        std::fs::write(&path, encode_wav(&original)).unwrap();

        let loaded = load_impulse(Some(&path)).unwrap();
        assert_eq!(loaded.sample_rate(), 16_000);
        assert_eq!(loaded.frames(), 4);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_impulse(Some(Path::new("/nonexistent/room.wav"))).unwrap_err();
        assert!(matches!(err, ImpulseError::Io { .. }));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("room.wav");
        std::fs::write(&path, b"definitely not a wav").unwrap();

        let err = load_impulse(Some(&path)).unwrap_err();
        assert!(matches!(err, ImpulseError::Decode { .. }));
    }
}
