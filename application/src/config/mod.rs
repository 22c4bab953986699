//! Application-level configuration.
//!
//! - [`ChatParams`]: retrieval fan-out, aggregation and history caps
//! - [`NarrationParams`]: whether narration runs and its mix settings

pub mod chat_params;

pub use chat_params::{ChatParams, NarrationParams};
