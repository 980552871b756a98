//! Ledger entry storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use xskill_types::{AccountId, EntryId, EntryKind, SessionId, Timestamp};

/// An immutable ledger entry. Once appended it is never edited or removed;
/// the full history backs audits and the balance invariant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntryRecord {
    pub id: EntryId,
    pub account_id: AccountId,
    /// The session that generated this entry, if any.
    pub session_id: Option<SessionId>,
    /// Signed credit delta: positive for credits, negative for debits.
    pub amount: i64,
    pub kind: EntryKind,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// Seed for appending an entry; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewLedgerEntry {
    pub account_id: AccountId,
    pub session_id: Option<SessionId>,
    pub amount: i64,
    pub kind: EntryKind,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// Trait for append-only ledger entry storage.
pub trait LedgerStore {
    fn append_entry(&self, new: NewLedgerEntry) -> Result<LedgerEntryRecord, StoreError>;
    fn entries_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<LedgerEntryRecord>, StoreError>;
    fn entry_count(&self) -> Result<u64, StoreError>;
}
