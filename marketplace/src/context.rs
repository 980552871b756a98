//! Request-scoped context.
//!
//! Who is acting and when, established by the authentication layer and the
//! caller's clock. Passed explicitly into every facade operation; the core
//! keeps no ambient session state.

use xskill_types::{AccountId, Timestamp};

#[derive(Clone, Copy, Debug)]
pub struct RequestContext {
    /// The authenticated account performing the operation.
    pub actor: AccountId,
    /// The time the request was received.
    pub now: Timestamp,
}

impl RequestContext {
    pub fn new(actor: AccountId, now: Timestamp) -> Self {
        Self { actor, now }
    }
}
