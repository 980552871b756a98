use thiserror::Error;
use xskill_store::StoreError;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("account not found: {0}")]
    NotFound(String),

    #[error("amount must be positive")]
    ZeroAmount,

    #[error("insufficient credits: need {needed}, have {available}")]
    InsufficientCredits { needed: u64, available: u64 },

    #[error("transfer endpoints must differ")]
    SelfTransfer,

    #[error("balance overflow")]
    Overflow,

    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => LedgerError::NotFound(key),
            other => LedgerError::Store(other),
        }
    }
}
