use thiserror::Error;
use xskill_store::StoreError;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("account {0} already has a pending verification request")]
    AlreadyPending(String),

    #[error("account {0} is already approved")]
    AlreadyApproved(String),

    #[error("request {request} is {status}, not pending")]
    NotPending { request: String, status: String },

    #[error("applicants cannot review their own request")]
    SelfReview,

    #[error("invalid evidence: {0}")]
    InvalidEvidence(String),

    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for VerificationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => VerificationError::NotFound(key),
            other => VerificationError::Store(other),
        }
    }
}
