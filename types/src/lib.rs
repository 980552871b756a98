//! Fundamental types for the XSkill marketplace core.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! identifiers, credit amounts, timestamps, marketplace parameters, and state enums.

pub mod credits;
pub mod error;
pub mod ids;
pub mod params;
pub mod state;
pub mod time;

pub use credits::Credits;
pub use error::TypeError;
pub use ids::{AccountId, EntryId, OfferingId, RequestId, SessionId};
pub use params::MarketParams;
pub use state::{Difficulty, EntryKind, Role, SessionStatus, VerificationStatus};
pub use time::Timestamp;
