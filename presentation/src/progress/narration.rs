//! Narration status indicator

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use mana_application::NarrationObserver;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Tracks whether MANA is speaking, optionally with a spinner.
///
/// The REPL reads [`NarrationIndicator::is_visible`] to decorate its prompt,
/// since a spinner would fight the line editor for the terminal.
pub struct NarrationIndicator {
    visible: AtomicBool,
    draw_target: Option<fn() -> ProgressDrawTarget>,
    spinner: Mutex<Option<ProgressBar>>,
}

impl NarrationIndicator {
    /// Indicator with a stderr spinner.
    pub fn spinner() -> Self {
        Self::with_draw_target(Some(ProgressDrawTarget::stderr))
    }

    /// Indicator that only tracks state.
    pub fn silent() -> Self {
        Self::with_draw_target(None)
    }

    fn with_draw_target(draw_target: Option<fn() -> ProgressDrawTarget>) -> Self {
        Self {
            visible: AtomicBool::new(false),
            draw_target,
            spinner: Mutex::new(None),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }
}

impl NarrationObserver for NarrationIndicator {
    fn on_narration_started(&self) {
        self.visible.store(true, Ordering::Release);

        let Some(target) = self.draw_target else {
            return;
        };
        if let Ok(mut slot) = self.spinner.lock() {
            let pb = ProgressBar::with_draw_target(None, target());
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.magenta} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&["♪  ", " ♫ ", "  ♪", " ♫ ", "♪  "]),
            );
            pb.set_message("MANA is speaking...");
            pb.enable_steady_tick(Duration::from_millis(150));
            if let Some(previous) = slot.replace(pb) {
                previous.finish_and_clear();
            }
        }
    }

    fn on_narration_stopped(&self) {
        self.visible.store(false, Ordering::Release);
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_and_clear();
        }
    }
}
