//! XScore — the derived reputation score.
//!
//! A pure function of an account's terminal session history: completed
//! sessions add weighted value (teaching weighs more than learning),
//! reliability failures (no-shows, cancellations after confirmation) drag
//! the weighted average down, and the result is clamped to `[0, 10]`.
//! Recomputing from the same history always yields the same value.

pub mod engine;
pub mod error;

pub use engine::ScoreEngine;
pub use error::ScoreError;
