//! Nullable infrastructure for deterministic testing.

pub mod clock;
pub mod notifier;

pub use clock::NullClock;
pub use notifier::{FailingNotifier, RecordingNotifier};
