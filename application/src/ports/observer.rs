//! Side-channel notifications for the UI
//!
//! Implementations live in the presentation layer (console spinner,
//! narration indicator). Both traits are synchronous and infallible.

use mana_domain::TurnPhase;

/// Callback for per-turn phase changes.
pub trait TurnObserver: Send + Sync {
    fn on_phase(&self, phase: TurnPhase);
}

/// Callback for the narrating indicator.
///
/// For every session `on_narration_started` is followed by exactly one
/// `on_narration_stopped`.
pub trait NarrationObserver: Send + Sync {
    fn on_narration_started(&self);
    fn on_narration_stopped(&self);
}

/// No-op observer for when progress reporting is not needed
pub struct NoTurnObserver;

impl TurnObserver for NoTurnObserver {
    fn on_phase(&self, _phase: TurnPhase) {}
}

pub struct NoNarrationObserver;

impl NarrationObserver for NoNarrationObserver {
    fn on_narration_started(&self) {}
    fn on_narration_stopped(&self) {}
}
