//! In-memory store — thread-safe maps behind mutexes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use xskill_store::account::{AccountRecord, AccountStore, NewAccount};
use xskill_store::ledger::{LedgerEntryRecord, LedgerStore, NewLedgerEntry};
use xskill_store::offering::{NewOffering, OfferingRecord, OfferingStore};
use xskill_store::session::{NewSession, SessionRecord, SessionStore};
use xskill_store::verification::{
    NewVerificationRequest, VerificationRequestRecord, VerificationStore,
};
use xskill_store::StoreError;
use xskill_types::{
    AccountId, Credits, EntryId, OfferingId, RequestId, SessionId, SessionStatus, Timestamp,
    VerificationStatus,
};

/// An in-memory implementation of all marketplace repositories.
/// Thread-safe; suitable for concurrent use from multiple request handlers.
pub struct MemoryStore {
    accounts: Mutex<HashMap<u64, AccountRecord>>,
    offerings: Mutex<HashMap<u64, OfferingRecord>>,
    sessions: Mutex<HashMap<u64, SessionRecord>>,
    entries: Mutex<Vec<LedgerEntryRecord>>,
    requests: Mutex<HashMap<u64, VerificationRequestRecord>>,
    next_account: AtomicU64,
    next_offering: AtomicU64,
    next_session: AtomicU64,
    next_entry: AtomicU64,
    next_request: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            offerings: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
            entries: Mutex::new(Vec::new()),
            requests: Mutex::new(HashMap::new()),
            next_account: AtomicU64::new(1),
            next_offering: AtomicU64::new(1),
            next_session: AtomicU64::new(1),
            next_entry: AtomicU64::new(1),
            next_request: AtomicU64::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for MemoryStore {
    fn insert_account(&self, new: NewAccount) -> Result<AccountRecord, StoreError> {
        let id = self.next_account.fetch_add(1, Ordering::SeqCst);
        let record = AccountRecord {
            id: AccountId::new(id),
            display_name: new.display_name,
            role: new.role,
            verified: false,
            verification_status: VerificationStatus::None,
            credit_balance: Credits::ZERO,
            x_score: 0.0,
            skills_offered: Vec::new(),
            skills_learning: Vec::new(),
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        self.accounts.lock().unwrap().insert(id, record.clone());
        Ok(record)
    }

    fn get_account(&self, id: AccountId) -> Result<AccountRecord, StoreError> {
        self.accounts
            .lock()
            .unwrap()
            .get(&id.raw())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn account_exists(&self, id: AccountId) -> Result<bool, StoreError> {
        Ok(self.accounts.lock().unwrap().contains_key(&id.raw()))
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        Ok(self.accounts.lock().unwrap().len() as u64)
    }

    fn set_balance(
        &self,
        id: AccountId,
        balance: Credits,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(&id.raw())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        account.credit_balance = balance;
        account.updated_at = updated_at;
        Ok(())
    }

    fn set_x_score(
        &self,
        id: AccountId,
        score: f64,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(&id.raw())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        account.x_score = score;
        account.updated_at = updated_at;
        Ok(())
    }

    fn set_verification(
        &self,
        id: AccountId,
        verified: bool,
        status: VerificationStatus,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(&id.raw())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        account.verified = verified;
        account.verification_status = status;
        account.updated_at = updated_at;
        Ok(())
    }
}

impl OfferingStore for MemoryStore {
    fn insert_offering(&self, new: NewOffering) -> Result<OfferingRecord, StoreError> {
        let id = self.next_offering.fetch_add(1, Ordering::SeqCst);
        let record = OfferingRecord {
            id: OfferingId::new(id),
            title: new.title,
            category: new.category,
            difficulty: new.difficulty,
            duration_minutes: new.duration_minutes,
            enrollments: 0,
            completions: 0,
            average_rating: 0.0,
            rating_count: 0,
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        self.offerings.lock().unwrap().insert(id, record.clone());
        Ok(record)
    }

    fn get_offering(&self, id: OfferingId) -> Result<OfferingRecord, StoreError> {
        self.offerings
            .lock()
            .unwrap()
            .get(&id.raw())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn record_enrollment(&self, id: OfferingId, now: Timestamp) -> Result<(), StoreError> {
        let mut offerings = self.offerings.lock().unwrap();
        let offering = offerings
            .get_mut(&id.raw())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        offering.enrollments += 1;
        offering.updated_at = now;
        Ok(())
    }

    fn record_completion(
        &self,
        id: OfferingId,
        rating: Option<u8>,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let mut offerings = self.offerings.lock().unwrap();
        let offering = offerings
            .get_mut(&id.raw())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        offering.completions += 1;
        if let Some(r) = rating {
            let total = offering.average_rating * offering.rating_count as f64 + f64::from(r);
            offering.rating_count += 1;
            offering.average_rating = total / offering.rating_count as f64;
        }
        offering.updated_at = now;
        Ok(())
    }
}

impl SessionStore for MemoryStore {
    fn insert_session(&self, new: NewSession) -> Result<SessionRecord, StoreError> {
        let id = self.next_session.fetch_add(1, Ordering::SeqCst);
        let record = SessionRecord {
            id: SessionId::new(id),
            offering_id: new.offering_id,
            teacher_id: new.teacher_id,
            learner_id: new.learner_id,
            scheduled_at: new.scheduled_at,
            duration_minutes: new.duration_minutes,
            status: SessionStatus::Pending,
            cost: new.cost,
            meeting_link: None,
            learner_notes: new.learner_notes,
            teacher_notes: None,
            learner_rating: None,
            teacher_rating: None,
            learner_feedback: None,
            teacher_feedback: None,
            confirmed_at: None,
            cancelled_by: None,
            cancellation_reason: None,
            created_at: new.created_at,
            updated_at: new.created_at,
            version: 1,
        };
        self.sessions.lock().unwrap().insert(id, record.clone());
        Ok(record)
    }

    fn get_session(&self, id: SessionId) -> Result<SessionRecord, StoreError> {
        self.sessions
            .lock()
            .unwrap()
            .get(&id.raw())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn update_session(
        &self,
        record: &SessionRecord,
        expected_version: u64,
    ) -> Result<SessionRecord, StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        let current = sessions
            .get(&record.id.raw())
            .ok_or_else(|| StoreError::NotFound(record.id.to_string()))?;
        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                actual: current.version,
            });
        }
        let mut stored = record.clone();
        stored.version = expected_version + 1;
        sessions.insert(record.id.raw(), stored.clone());
        Ok(stored)
    }

    fn sessions_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<SessionRecord>, StoreError> {
        let mut found: Vec<SessionRecord> = self
            .sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.is_party(account))
            .cloned()
            .collect();
        found.sort_by_key(|s| s.id);
        Ok(found)
    }

    fn session_count(&self) -> Result<u64, StoreError> {
        Ok(self.sessions.lock().unwrap().len() as u64)
    }
}

impl LedgerStore for MemoryStore {
    fn append_entry(&self, new: NewLedgerEntry) -> Result<LedgerEntryRecord, StoreError> {
        let id = self.next_entry.fetch_add(1, Ordering::SeqCst);
        let record = LedgerEntryRecord {
            id: EntryId::new(id),
            account_id: new.account_id,
            session_id: new.session_id,
            amount: new.amount,
            kind: new.kind,
            description: new.description,
            created_at: new.created_at,
        };
        self.entries.lock().unwrap().push(record.clone());
        Ok(record)
    }

    fn entries_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<LedgerEntryRecord>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.account_id == account)
            .cloned()
            .collect())
    }

    fn entry_count(&self) -> Result<u64, StoreError> {
        Ok(self.entries.lock().unwrap().len() as u64)
    }
}

impl VerificationStore for MemoryStore {
    fn insert_request(
        &self,
        new: NewVerificationRequest,
    ) -> Result<VerificationRequestRecord, StoreError> {
        let id = self.next_request.fetch_add(1, Ordering::SeqCst);
        let record = VerificationRequestRecord {
            id: RequestId::new(id),
            account_id: new.account_id,
            evidence: new.evidence,
            status: VerificationStatus::Pending,
            reviewer_id: None,
            review_notes: None,
            reviewed_at: None,
            created_at: new.created_at,
        };
        self.requests.lock().unwrap().insert(id, record.clone());
        Ok(record)
    }

    fn get_request(&self, id: RequestId) -> Result<VerificationRequestRecord, StoreError> {
        self.requests
            .lock()
            .unwrap()
            .get(&id.raw())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn put_request(&self, record: &VerificationRequestRecord) -> Result<(), StoreError> {
        let mut requests = self.requests.lock().unwrap();
        if !requests.contains_key(&record.id.raw()) {
            return Err(StoreError::NotFound(record.id.to_string()));
        }
        requests.insert(record.id.raw(), record.clone());
        Ok(())
    }

    fn pending_request_for(
        &self,
        account: AccountId,
    ) -> Result<Option<VerificationRequestRecord>, StoreError> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .values()
            .find(|r| r.account_id == account && r.status == VerificationStatus::Pending)
            .cloned())
    }

    fn requests_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<VerificationRequestRecord>, StoreError> {
        let mut found: Vec<VerificationRequestRecord> = self
            .requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.account_id == account)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.id);
        Ok(found)
    }
}
