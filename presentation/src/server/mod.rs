//! HTTP proxy server
//!
//! Exposes the retrieval, completion and speech steps individually
//! (`/api/kb`, `/api/llm`, `/api/tts`) plus a whole turn (`/api/chat`).
//! Credentials stay server-side; the caller sends its history each time.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
