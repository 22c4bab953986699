//! Chat turn values and the per-turn state machine.

pub mod phase;
pub mod turn;

pub use phase::{TurnPhase, TurnState};
pub use turn::{
    ChatRequest, ChatResponse, ErrorDescriptor, ErrorKind, GENERIC_FAILURE_MESSAGE,
};
