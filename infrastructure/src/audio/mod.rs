//! Audio adapters: output sinks and the reverb impulse loader.

pub mod impulse;
pub mod sinks;

#[cfg(feature = "playback")]
pub mod cpal_sink;

#[cfg(feature = "playback")]
pub use cpal_sink::CpalAudioSink;
pub use impulse::{ImpulseError, load_impulse, synthetic_impulse};
pub use sinks::{NullAudioSink, WavFileSink};
