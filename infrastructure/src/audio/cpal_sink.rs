//! Live playback on the default output device.
//!
//! `cpal` streams are not `Send`, so each narration owns a blocking thread
//! that builds the stream, feeds it and drops it when playback ends or the
//! narration is cancelled.

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};
use mana_application::{AudioOutputPort, PlaybackError};
use mana_domain::AudioBuffer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Plays narration on an output device.
#[derive(Debug, Default, Clone)]
pub struct CpalAudioSink {
    /// Device name; the host default when `None`.
    device_name: Option<String>,
}

impl CpalAudioSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }
}

#[async_trait]
impl AudioOutputPort for CpalAudioSink {
    async fn play(&self, buffer: AudioBuffer, cancel: CancellationToken) -> Result<(), PlaybackError> {
        let device_name = self.device_name.clone();
        tokio::task::spawn_blocking(move || play_blocking(device_name.as_deref(), &buffer, &cancel))
            .await
            .map_err(|e| PlaybackError::Device(format!("playback thread failed: {}", e)))?
    }
}

fn play_blocking(
    device_name: Option<&str>,
    buffer: &AudioBuffer,
    cancel: &CancellationToken,
) -> Result<(), PlaybackError> {
    let host = cpal::default_host();
    let device = match device_name {
        Some(name) => host
            .output_devices()
            .map_err(|e| PlaybackError::Device(e.to_string()))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| PlaybackError::Device(format!("output device '{}' not found", name)))?,
        None => host
            .default_output_device()
            .ok_or_else(|| PlaybackError::Device("no default output device".to_string()))?,
    };

    let supported = device
        .default_output_config()
        .map_err(|e| PlaybackError::Device(e.to_string()))?;
    let format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    let samples = Arc::new(adapt_for_device(buffer, config.sample_rate.0, config.channels));
    debug!(
        device = %device.name().unwrap_or_default(),
        rate = config.sample_rate.0,
        channels = config.channels,
        ?format,
        "Opening output stream"
    );

    let finished = Arc::new(AtomicBool::new(false));
    let stream = match format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, samples, finished.clone()),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, samples, finished.clone()),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, samples, finished.clone()),
        other => Err(PlaybackError::Device(format!(
            "unsupported sample format {:?}",
            other
        ))),
    }?;
    stream
        .play()
        .map_err(|e| PlaybackError::Device(e.to_string()))?;

    while !finished.load(Ordering::Acquire) && !cancel.is_cancelled() {
        std::thread::sleep(POLL_INTERVAL);
    }
    drop(stream);

    if cancel.is_cancelled() {
        info!("Playback stopped");
    }
    Ok(())
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Arc<Vec<f32>>,
    finished: Arc<AtomicBool>,
) -> Result<cpal::Stream, PlaybackError>
where
    T: SizedSample + FromSample<f32>,
{
    let position = AtomicUsize::new(0);
    device
        .build_output_stream(
            config,
            move |out: &mut [T], _: &cpal::OutputCallbackInfo| {
                for slot in out.iter_mut() {
                    let i = position.fetch_add(1, Ordering::Relaxed);
                    *slot = match samples.get(i) {
                        Some(&s) => T::from_sample(s),
                        None => {
                            finished.store(true, Ordering::Release);
                            T::EQUILIBRIUM
                        }
                    };
                }
            },
            |e| error!("Output stream error: {}", e),
            None,
        )
        .map_err(|e| PlaybackError::Device(e.to_string()))
}

/// Convert to the device's rate (nearest sample) and channel count.
fn adapt_for_device(buffer: &AudioBuffer, rate: u32, channels: u16) -> Vec<f32> {
    let planes = buffer.planes();
    if planes.is_empty() || channels == 0 || rate == 0 {
        return Vec::new();
    }
    let in_frames = buffer.frames();
    let out_frames =
        ((in_frames as u64 * rate as u64) / buffer.sample_rate().max(1) as u64) as usize;

    let mut out = Vec::with_capacity(out_frames * channels as usize);
    for frame in 0..out_frames {
        let src = ((frame as u64 * buffer.sample_rate() as u64) / rate as u64) as usize;
        let src = src.min(in_frames.saturating_sub(1));
        for ch in 0..channels as usize {
            let plane = &planes[ch.min(planes.len() - 1)];
            out.push(plane[src]);
        }
    }
    out
}
