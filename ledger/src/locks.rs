//! Per-account lock registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use xskill_types::AccountId;

/// Hands out one mutex per account id, created on first use.
///
/// Locks are only ever held for the duration of a single ledger operation;
/// the registry itself is locked just long enough to fetch or create the
/// per-account handle.
pub struct LockRegistry {
    locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The lock handle for one account.
    pub fn handle(&self, account: AccountId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        Arc::clone(locks.entry(account.raw()).or_default())
    }

    /// Lock handles for two distinct accounts, ordered by ascending id so
    /// every multi-account caller acquires in the same global order.
    pub fn ordered_pair(
        &self,
        a: AccountId,
        b: AccountId,
    ) -> (Arc<Mutex<()>>, Arc<Mutex<()>>) {
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        (self.handle(first), self.handle(second))
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
