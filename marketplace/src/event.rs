//! Events emitted after each committed use case.

use xskill_types::{AccountId, RequestId, SessionId};

/// Marketplace-level events observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug)]
pub enum MarketEvent {
    /// A learner booked a session; credits moved into escrow.
    SessionBooked {
        session: SessionId,
        teacher: AccountId,
        learner: AccountId,
        cost: u64,
    },
    /// The teacher confirmed a pending session.
    SessionConfirmed { session: SessionId },
    /// A party cancelled; the learner was refunded in full.
    SessionCancelled {
        session: SessionId,
        by: AccountId,
        was_confirmed: bool,
        refunded: u64,
    },
    /// A session completed; the escrowed credits paid out to the teacher.
    SessionCompleted {
        session: SessionId,
        teacher: AccountId,
        learner: AccountId,
        amount: u64,
        learner_rating: Option<u8>,
    },
    /// The teacher reported the learner never appeared; learner refunded.
    SessionNoShow {
        session: SessionId,
        teacher: AccountId,
        learner: AccountId,
        refunded: u64,
    },
    /// An account submitted teacher verification evidence.
    VerificationSubmitted {
        request: RequestId,
        account: AccountId,
    },
    /// A pending verification request was decided.
    VerificationReviewed {
        request: RequestId,
        account: AccountId,
        approved: bool,
    },
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the emitting thread; keep handlers fast
/// to avoid stalling the use case that emitted.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&MarketEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&MarketEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &MarketEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
