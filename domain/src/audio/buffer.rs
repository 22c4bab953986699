//! Decoded audio held in memory

use std::time::Duration;

/// Interleaved floating-point samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: u16,
    samples: Vec<f32>,
}

impl AudioBuffer {
    /// Create a buffer. A trailing partial frame is dropped.
    pub fn new(sample_rate: u32, channels: u16, mut samples: Vec<f32>) -> Self {
        let channels = channels.max(1);
        let whole = samples.len() - samples.len() % channels as usize;
        samples.truncate(whole);
        Self {
            sample_rate,
            channels,
            samples,
        }
    }

    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self::new(sample_rate, 1, samples)
    }

    /// Build a stereo buffer from separate left/right channels, padding the
    /// shorter one with silence.
    pub fn from_stereo_planes(sample_rate: u32, left: &[f32], right: &[f32]) -> Self {
        let frames = left.len().max(right.len());
        let mut samples = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            samples.push(left.get(i).copied().unwrap_or(0.0));
            samples.push(right.get(i).copied().unwrap_or(0.0));
        }
        Self::new(sample_rate, 2, samples)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Average all channels into one.
    pub fn to_mono(&self) -> Vec<f32> {
        let channels = self.channels as usize;
        if channels == 1 {
            return self.samples.clone();
        }
        self.samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    }

    /// Split into one vector per channel.
    pub fn planes(&self) -> Vec<Vec<f32>> {
        let channels = self.channels as usize;
        let mut planes = vec![Vec::with_capacity(self.frames()); channels];
        for frame in self.samples.chunks_exact(channels) {
            for (plane, sample) in planes.iter_mut().zip(frame) {
                plane.push(*sample);
            }
        }
        planes
    }

    /// Mono samples at `target_rate`, nearest-sample resampled.
    pub fn mono_at_rate(&self, target_rate: u32) -> Vec<f32> {
        let mono = self.to_mono();
        if target_rate == self.sample_rate || self.sample_rate == 0 || target_rate == 0 {
            return mono;
        }
        let ratio = self.sample_rate as f64 / target_rate as f64;
        let out_len = (mono.len() as f64 / ratio).round() as usize;
        (0..out_len)
            .filter_map(|i| mono.get((i as f64 * ratio) as usize).copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_frame_dropped() {
        let buffer = AudioBuffer::new(8000, 2, vec![0.1, 0.2, 0.3]);
        assert_eq!(buffer.frames(), 1);
        assert_eq!(buffer.samples(), &[0.1, 0.2]);
    }

    #[test]
    fn test_duration() {
        let buffer = AudioBuffer::mono(4, vec![0.0; 6]);
        assert_eq!(buffer.duration(), Duration::from_millis(1500));
    }

    #[test]
    fn test_to_mono_and_planes() {
        let buffer = AudioBuffer::new(10, 2, vec![1.0, 0.0, 0.5, 0.5]);
        assert_eq!(buffer.to_mono(), vec![0.5, 0.5]);
        assert_eq!(buffer.planes(), vec![vec![1.0, 0.5], vec![0.0, 0.5]]);
    }

    #[test]
    fn test_stereo_planes_pad_shorter_channel() {
        let buffer = AudioBuffer::from_stereo_planes(10, &[1.0, 2.0], &[3.0]);
        assert_eq!(buffer.samples(), &[1.0, 3.0, 2.0, 0.0]);
    }

    #[test]
    fn test_mono_at_rate_halves_length() {
        let buffer = AudioBuffer::mono(48_000, (0..8).map(|i| i as f32).collect());
        assert_eq!(buffer.mono_at_rate(24_000), vec![0.0, 2.0, 4.0, 6.0]);
        assert_eq!(buffer.mono_at_rate(48_000).len(), 8);
    }
}
