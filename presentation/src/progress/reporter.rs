//! Progress reporting for chat turns

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use mana_application::TurnObserver;
use mana_domain::TurnPhase;
use std::sync::Mutex;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Shows a spinner while a turn retrieves context and waits for the reply
pub struct TurnProgressReporter {
    draw_target: fn() -> ProgressDrawTarget,
    spinner: Mutex<Option<ProgressBar>>,
}

impl TurnProgressReporter {
    pub fn new() -> Self {
        Self {
            draw_target: ProgressDrawTarget::stderr,
            spinner: Mutex::new(None),
        }
    }

    /// Reporter that tracks phases without drawing anything.
    pub fn hidden() -> Self {
        Self {
            draw_target: ProgressDrawTarget::hidden,
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn phase_message(phase: TurnPhase) -> Option<&'static str> {
        match phase {
            TurnPhase::Retrieving => Some("Searching the knowledge base..."),
            TurnPhase::Completing => Some("MANA is thinking..."),
            _ => None,
        }
    }

    /// Whether a spinner is currently shown.
    pub fn is_active(&self) -> bool {
        self.spinner
            .lock()
            .map(|s| s.is_some())
            .unwrap_or(false)
    }
}

impl Default for TurnProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnObserver for TurnProgressReporter {
    fn on_phase(&self, phase: TurnPhase) {
        let Ok(mut slot) = self.spinner.lock() else {
            return;
        };

        match Self::phase_message(phase) {
            Some(message) => {
                let pb = slot.get_or_insert_with(|| {
                    let pb = ProgressBar::with_draw_target(None, (self.draw_target)());
                    pb.set_style(Self::spinner_style());
                    pb.set_prefix("mana");
                    pb.enable_steady_tick(TICK);
                    pb
                });
                pb.set_message(message);
            }
            None => {
                if let Some(pb) = slot.take() {
                    pb.finish_and_clear();
                }
            }
        }
    }
}

/// Plain line-per-phase progress (no spinner), for non-interactive terminals
pub struct SimpleProgress;

impl TurnObserver for SimpleProgress {
    fn on_phase(&self, phase: TurnPhase) {
        if let Some(message) = TurnProgressReporter::phase_message(phase) {
            eprintln!("{} {}", "->".cyan(), message);
        }
    }
}
