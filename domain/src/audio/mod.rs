//! Narration audio: buffers, payload codecs, convolution and the mix graph.

pub mod buffer;
pub mod codec;
pub mod convolve;
pub mod graph;

pub use buffer::AudioBuffer;
pub use codec::{AudioFormat, decode, decode_pcm16le, decode_wav, encode_wav};
pub use convolve::{convolve, normalize_impulse};
pub use graph::{Connection, MixGraph, MixNode, MixSettings, NodeId};
