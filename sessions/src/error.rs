use thiserror::Error;
use xskill_store::StoreError;
use xskill_types::SessionStatus;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("account {actor} may not {action} this session")]
    Forbidden {
        actor: String,
        action: &'static str,
    },

    #[error("cannot {action} session {session} in status {status}")]
    InvalidState {
        session: String,
        status: SessionStatus,
        action: &'static str,
    },

    #[error("session {0} cannot complete before its scheduled time")]
    NotYetHeld(String),

    #[error("scheduled time must be strictly in the future")]
    ScheduleNotFuture,

    #[error("teacher and learner must be different accounts")]
    SelfBooking,

    #[error("duration {minutes}min is outside the allowed {min}..={max}min")]
    DurationOutOfBounds { minutes: u32, min: u32, max: u32 },

    #[error("rating {0} is outside 1..=5")]
    InvalidRating(u8),

    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => SessionError::NotFound(key),
            other => SessionError::Store(other),
        }
    }
}
