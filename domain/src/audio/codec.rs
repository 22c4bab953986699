//! Raw PCM and RIFF/WAVE decoding, WAV encoding

use super::buffer::AudioBuffer;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

const WAVE_FORMAT_PCM: u16 = 1;
const WAVE_FORMAT_IEEE_FLOAT: u16 = 3;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Highest sample rate accepted from a payload header.
pub const MAX_SAMPLE_RATE: u32 = 768_000;

/// Encoding of a synthesized speech payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioFormat {
    /// Headerless signed 16-bit little-endian mono.
    Pcm16 { sample_rate: u32 },
    Wav,
    Mpeg,
}

impl AudioFormat {
    /// Parse a speech-service output format identifier such as
    /// `pcm_24000`, `mp3_44100_128` or `wav_44100`.
    pub fn from_output_format(id: &str) -> Option<Self> {
        let (family, rest) = id.split_once('_').unwrap_or((id, ""));
        match family {
            "pcm" => {
                let rate = rest.split('_').next()?.parse().ok()?;
                Some(AudioFormat::Pcm16 { sample_rate: rate })
            }
            "mp3" => Some(AudioFormat::Mpeg),
            "wav" => Some(AudioFormat::Wav),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Pcm16 { .. } => "audio/pcm",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mpeg => "audio/mpeg",
        }
    }
}

/// Decode a payload into a playable buffer.
///
/// A payload declared as PCM that carries a RIFF header is decoded as WAV.
pub fn decode(bytes: &[u8], format: AudioFormat) -> Result<AudioBuffer, DomainError> {
    if bytes.is_empty() {
        return Err(DomainError::AudioDecode("empty audio payload".to_string()));
    }
    match format {
        _ if bytes.starts_with(b"RIFF") => decode_wav(bytes),
        AudioFormat::Pcm16 { sample_rate } => decode_pcm16le(bytes, sample_rate, 1),
        AudioFormat::Wav => decode_wav(bytes),
        AudioFormat::Mpeg => Err(DomainError::UnsupportedAudioFormat(
            "MPEG audio cannot be decoded; request a pcm_* output format".to_string(),
        )),
    }
}

/// Decode headerless signed 16-bit little-endian samples.
pub fn decode_pcm16le(
    bytes: &[u8],
    sample_rate: u32,
    channels: u16,
) -> Result<AudioBuffer, DomainError> {
    if sample_rate == 0 || sample_rate > MAX_SAMPLE_RATE {
        return Err(DomainError::AudioDecode(format!(
            "unsupported sample rate {sample_rate}"
        )));
    }
    if bytes.len() % 2 != 0 {
        return Err(DomainError::AudioDecode(format!(
            "PCM16 payload has odd length {}",
            bytes.len()
        )));
    }
    let samples = bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
        .collect();
    Ok(AudioBuffer::new(sample_rate, channels, samples))
}

struct WavFormat {
    tag: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

/// Decode a RIFF/WAVE file holding 8/16/24-bit PCM or 32-bit float samples.
pub fn decode_wav(bytes: &[u8]) -> Result<AudioBuffer, DomainError> {
    let bad = |msg: &str| DomainError::AudioDecode(format!("WAV: {msg}"));

    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(bad("missing RIFF/WAVE header"));
    }

    let mut format: Option<WavFormat> = None;
    let mut pos = 12;

    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = read_u32(bytes, pos + 4) as usize;
        let body_start = pos + 8;
        let body_end = body_start.saturating_add(size).min(bytes.len());
        let body = &bytes[body_start..body_end];

        match id {
            b"fmt " => {
                if body.len() < 16 {
                    return Err(bad("fmt chunk too short"));
                }
                let mut tag = read_u16(body, 0);
                if tag == WAVE_FORMAT_EXTENSIBLE && body.len() >= 26 {
                    tag = read_u16(body, 24);
                }
                format = Some(WavFormat {
                    tag,
                    channels: read_u16(body, 2),
                    sample_rate: read_u32(body, 4),
                    bits_per_sample: read_u16(body, 14),
                });
            }
            b"data" => {
                let fmt = format.as_ref().ok_or_else(|| bad("data chunk before fmt chunk"))?;
                let samples = decode_samples(body, fmt)?;
                if fmt.channels == 0 || fmt.sample_rate == 0 {
                    return Err(bad("zero channels or sample rate"));
                }
                if fmt.sample_rate > MAX_SAMPLE_RATE {
                    return Err(bad(&format!("sample rate {} out of range", fmt.sample_rate)));
                }
                return Ok(AudioBuffer::new(fmt.sample_rate, fmt.channels, samples));
            }
            _ => {}
        }

        // Chunks are word-aligned.
        pos = body_start.saturating_add(size + size % 2);
    }

    Err(bad("no data chunk"))
}

fn decode_samples(body: &[u8], fmt: &WavFormat) -> Result<Vec<f32>, DomainError> {
    let samples = match (fmt.tag, fmt.bits_per_sample) {
        (WAVE_FORMAT_PCM, 8) => body.iter().map(|b| (*b as f32 - 128.0) / 128.0).collect(),
        (WAVE_FORMAT_PCM, 16) => body
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
            .collect(),
        (WAVE_FORMAT_PCM, 24) => body
            .chunks_exact(3)
            .map(|b| {
                let v = i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8;
                v as f32 / 8_388_608.0
            })
            .collect(),
        (WAVE_FORMAT_IEEE_FLOAT, 32) => body
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        (tag, bits) => {
            return Err(DomainError::UnsupportedAudioFormat(format!(
                "WAV format tag {tag} with {bits} bits per sample"
            )));
        }
    };
    Ok(samples)
}

/// Encode a buffer as a 16-bit PCM WAV file. Samples are clipped to [-1, 1].
pub fn encode_wav(buffer: &AudioBuffer) -> Vec<u8> {
    let channels = buffer.channels();
    let sample_rate = buffer.sample_rate();
    let data_len = u32::try_from(buffer.samples().len() * 2).unwrap_or(u32::MAX);
    let block_align = channels.saturating_mul(2);

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&data_len.saturating_add(36).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&sample_rate.saturating_mul(u32::from(block_align)).to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in buffer.samples() {
        let clipped = sample.clamp(-1.0, 1.0);
        out.extend_from_slice(&((clipped * 32767.0).round() as i16).to_le_bytes());
    }
    out
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
