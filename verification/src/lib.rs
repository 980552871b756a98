//! Teacher verification workflow.
//!
//! An account moves `none -> pending -> {approved, rejected}`, with
//! resubmission allowed after rejection. Approval flips the account's
//! `verified` flag, the gate every teacher-side session operation checks.

pub mod error;
pub mod workflow;

pub use error::VerificationError;
pub use workflow::{ReviewDecision, VerificationWorkflow};
