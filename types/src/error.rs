//! Parse errors for the shared types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypeError {
    #[error("unknown session status: {0}")]
    UnknownSessionStatus(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),
}
