//! Per-turn state machine
//!
//! ```text
//! Idle ──► Retrieving ──► Completing ──► Narrating ──► Done
//!   │          │              │    └───────────────────►│
//!   └──────────┴──────────────┴──► Errored
//! ```
//!
//! `Done` and `Errored` are absorbing. Narration never leads to `Errored`:
//! by the time it runs the reply has already been delivered.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Idle,
    Retrieving,
    Completing,
    Narrating,
    Done,
    Errored,
}

impl TurnPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnPhase::Idle => "idle",
            TurnPhase::Retrieving => "retrieving",
            TurnPhase::Completing => "completing",
            TurnPhase::Narrating => "narrating",
            TurnPhase::Done => "done",
            TurnPhase::Errored => "errored",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnPhase::Done | TurnPhase::Errored)
    }

    pub fn can_transition_to(&self, next: TurnPhase) -> bool {
        use TurnPhase::*;
        match (self, next) {
            (Idle, Retrieving) => true,
            (Retrieving, Completing) => true,
            (Completing, Narrating) | (Completing, Done) => true,
            (Narrating, Done) => true,
            (Idle | Retrieving | Completing, Errored) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current phase of one chat turn, advanced only along legal edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnState {
    phase: TurnPhase,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            phase: TurnPhase::Idle,
        }
    }
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn advance(&mut self, next: TurnPhase) -> Result<TurnPhase, DomainError> {
        if !self.phase.can_transition_to(next) {
            return Err(DomainError::IllegalTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        self.phase = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_with_narration() {
        let mut state = TurnState::new();
        for next in [
            TurnPhase::Retrieving,
            TurnPhase::Completing,
            TurnPhase::Narrating,
            TurnPhase::Done,
        ] {
            state.advance(next).unwrap();
        }
        assert!(state.phase().is_terminal());
    }

    #[test]
    fn test_errored_reachable_before_reply() {
        for start in [TurnPhase::Idle, TurnPhase::Retrieving, TurnPhase::Completing] {
            assert!(start.can_transition_to(TurnPhase::Errored));
        }
        assert!(!TurnPhase::Narrating.can_transition_to(TurnPhase::Errored));
    }

    #[test]
    fn test_terminal_states_absorb() {
        let mut state = TurnState::new();
        state.advance(TurnPhase::Errored).unwrap();
        let err = state.advance(TurnPhase::Retrieving).unwrap_err();
        assert_eq!(
            err,
            DomainError::IllegalTransition {
                from: "errored".to_string(),
                to: "retrieving".to_string()
            }
        );
        assert!(!TurnPhase::Done.can_transition_to(TurnPhase::Errored));
    }

    #[test]
    fn test_cannot_skip_retrieval() {
        let mut state = TurnState::new();
        assert!(state.advance(TurnPhase::Completing).is_err());
        assert_eq!(state.phase(), TurnPhase::Idle);
    }
}
