//! The facade error taxonomy.
//!
//! Engine-level errors are converted into these typed outcomes at the
//! boundary. Every error is terminal to its use case; nothing is retried
//! here; a caller that lost a state race can re-read and decide.

use thiserror::Error;
use xskill_ledger::LedgerError;
use xskill_sessions::SessionError;
use xskill_store::StoreError;
use xskill_types::AccountId;
use xskill_verification::VerificationError;
use xskill_xscore::ScoreError;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("insufficient credits: need {needed}, have {available}")]
    InsufficientCredits { needed: u64, available: u64 },

    #[error("account {0} is not a verified teacher")]
    NotVerified(AccountId),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<StoreError> for MarketError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => MarketError::NotFound(key),
            StoreError::VersionConflict { .. } => {
                MarketError::InvalidState("the record was modified concurrently".into())
            }
            other => MarketError::Storage(other.to_string()),
        }
    }
}

impl From<LedgerError> for MarketError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(key) => MarketError::NotFound(key),
            LedgerError::InsufficientCredits { needed, available } => {
                MarketError::InsufficientCredits { needed, available }
            }
            LedgerError::ZeroAmount | LedgerError::SelfTransfer => {
                MarketError::InvalidArgument(err.to_string())
            }
            LedgerError::Overflow => MarketError::Storage(err.to_string()),
            LedgerError::Store(inner) => inner.into(),
        }
    }
}

impl From<SessionError> for MarketError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(key) => MarketError::NotFound(key),
            SessionError::Forbidden { .. } => MarketError::Forbidden(err.to_string()),
            SessionError::InvalidState { .. } | SessionError::NotYetHeld(_) => {
                MarketError::InvalidState(err.to_string())
            }
            SessionError::ScheduleNotFuture
            | SessionError::SelfBooking
            | SessionError::DurationOutOfBounds { .. }
            | SessionError::InvalidRating(_) => MarketError::InvalidArgument(err.to_string()),
            SessionError::Store(inner) => inner.into(),
        }
    }
}

impl From<VerificationError> for MarketError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::NotFound(key) => MarketError::NotFound(key),
            VerificationError::AlreadyPending(_) => MarketError::Conflict(err.to_string()),
            VerificationError::AlreadyApproved(_) | VerificationError::NotPending { .. } => {
                MarketError::InvalidState(err.to_string())
            }
            VerificationError::SelfReview | VerificationError::InvalidEvidence(_) => {
                MarketError::InvalidArgument(err.to_string())
            }
            VerificationError::Store(inner) => inner.into(),
        }
    }
}

impl From<ScoreError> for MarketError {
    fn from(err: ScoreError) -> Self {
        match err {
            ScoreError::NotFound(key) => MarketError::NotFound(key),
            ScoreError::Store(inner) => inner.into(),
        }
    }
}
