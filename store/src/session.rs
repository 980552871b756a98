//! Session storage trait with optimistic versioning.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use xskill_types::{AccountId, OfferingId, SessionId, SessionStatus, Timestamp};

/// A booked session between a teacher and a learner.
///
/// Sessions are never deleted; terminal states are retained for history.
/// `version` increments on every write and backs the compare-and-swap that
/// serialises concurrent transitions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub offering_id: OfferingId,
    pub teacher_id: AccountId,
    pub learner_id: AccountId,
    pub scheduled_at: Timestamp,
    pub duration_minutes: u32,
    pub status: SessionStatus,
    /// Credits debited from the learner at booking time.
    pub cost: u64,
    pub meeting_link: Option<String>,
    pub learner_notes: Option<String>,
    pub teacher_notes: Option<String>,
    /// Rating the learner gave the teacher, 1..=5.
    pub learner_rating: Option<u8>,
    /// Rating the teacher gave the learner, 1..=5.
    pub teacher_rating: Option<u8>,
    pub learner_feedback: Option<String>,
    pub teacher_feedback: Option<String>,
    /// When the teacher confirmed, if the session ever reached `Confirmed`.
    /// Survives later transitions so reliability scoring can tell a
    /// pre-confirmation cancellation from a post-confirmation one.
    pub confirmed_at: Option<Timestamp>,
    /// Which party cancelled, for terminal `Cancelled` sessions.
    pub cancelled_by: Option<AccountId>,
    pub cancellation_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub version: u64,
}

impl SessionRecord {
    /// Whether `account` is one of the two parties.
    pub fn is_party(&self, account: AccountId) -> bool {
        self.teacher_id == account || self.learner_id == account
    }
}

/// Seed for inserting a new session; the store assigns id and version.
#[derive(Clone, Debug)]
pub struct NewSession {
    pub offering_id: OfferingId,
    pub teacher_id: AccountId,
    pub learner_id: AccountId,
    pub scheduled_at: Timestamp,
    pub duration_minutes: u32,
    pub cost: u64,
    pub learner_notes: Option<String>,
    pub created_at: Timestamp,
}

/// Trait for session storage operations.
pub trait SessionStore {
    fn insert_session(&self, new: NewSession) -> Result<SessionRecord, StoreError>;
    fn get_session(&self, id: SessionId) -> Result<SessionRecord, StoreError>;

    /// Write `record` iff the stored version still equals `expected_version`;
    /// the stored version is bumped past `expected_version` on success.
    /// Returns `StoreError::VersionConflict` when another writer got there
    /// first.
    fn update_session(
        &self,
        record: &SessionRecord,
        expected_version: u64,
    ) -> Result<SessionRecord, StoreError>;

    /// Every session where `account` is a party, any status.
    fn sessions_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<SessionRecord>, StoreError>;

    fn session_count(&self) -> Result<u64, StoreError>;
}
