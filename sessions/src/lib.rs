//! Session lifecycle state machine.
//!
//! `pending -> confirmed -> completed`, with `cancelled` reachable from both
//! live states and `no_show` from `confirmed`. Terminal states never
//! transition again. Concurrent transitions are serialised by a
//! compare-and-swap on the session version; the loser of a race observes
//! an invalid-state error, never a corrupted record.

pub mod error;
pub mod machine;
pub mod transition;

pub use error::SessionError;
pub use machine::{CancelOutcome, CompletionInput, SessionMachine};
