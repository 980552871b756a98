use thiserror::Error;
use xskill_store::StoreError;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("account not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ScoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => ScoreError::NotFound(key),
            other => ScoreError::Store(other),
        }
    }
}
