//! Port definitions (interfaces for external dependencies)
//!
//! Ports define the interfaces that the application layer uses to interact
//! with the remote services and the audio device. Implementations (adapters)
//! live in the infrastructure layer.

pub mod audio_output;
pub mod completion;
pub mod conversation_logger;
pub mod embedding;
pub mod observer;
pub mod service_error;
pub mod speech;
pub mod vector_index;
