//! Outbound notification dispatch.
//!
//! Dispatch happens after the transactional core has committed and is
//! fire-and-forget: a failing dispatcher is logged and swallowed, never
//! surfaced as a use-case failure.

use serde_json::json;
use thiserror::Error;
use xskill_types::AccountId;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

/// A message for one account, with an opaque payload the delivery channel
/// (email, push, in-app) can render as it sees fit.
#[derive(Clone, Debug)]
pub struct Notification {
    pub account: AccountId,
    pub subject: String,
    pub body: String,
    pub payload: serde_json::Value,
}

impl Notification {
    pub fn new(
        account: AccountId,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            account,
            subject: subject.into(),
            body: body.into(),
            payload: json!({}),
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Delivery channel for notifications. Implementations live outside the
/// core (email sender, push gateway); tests use recording or failing stubs.
pub trait Notifier: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).deliver(notification)
    }
}
