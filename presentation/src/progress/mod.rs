//! Turn and narration progress indicators

pub mod narration;
pub mod reporter;

pub use narration::NarrationIndicator;
pub use reporter::{SimpleProgress, TurnProgressReporter};
