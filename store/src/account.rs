//! Account storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use xskill_types::{AccountId, Credits, Role, Timestamp, VerificationStatus};

/// Per-account information held by the marketplace.
///
/// `credit_balance` and `x_score` are projections owned by the core: the
/// balance equals the sum of the account's ledger entries and the score is
/// recomputed from session history. Nothing outside the engines writes them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: AccountId,
    pub display_name: String,
    pub role: Role,
    /// Whether the account may act as teacher. Cached from the latest
    /// verification outcome.
    pub verified: bool,
    pub verification_status: VerificationStatus,
    pub credit_balance: Credits,
    pub x_score: f64,
    pub skills_offered: Vec<String>,
    pub skills_learning: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Seed for inserting a new account; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub display_name: String,
    pub role: Role,
    pub created_at: Timestamp,
}

/// Trait for account storage operations.
///
/// Mutators are per-field so that concurrent writers of unrelated
/// projections (balance vs. score vs. verification) can never clobber each
/// other through a whole-record write.
pub trait AccountStore {
    fn insert_account(&self, new: NewAccount) -> Result<AccountRecord, StoreError>;
    fn get_account(&self, id: AccountId) -> Result<AccountRecord, StoreError>;
    fn account_exists(&self, id: AccountId) -> Result<bool, StoreError>;
    fn account_count(&self) -> Result<u64, StoreError>;

    fn set_balance(
        &self,
        id: AccountId,
        balance: Credits,
        updated_at: Timestamp,
    ) -> Result<(), StoreError>;

    fn set_x_score(
        &self,
        id: AccountId,
        score: f64,
        updated_at: Timestamp,
    ) -> Result<(), StoreError>;

    fn set_verification(
        &self,
        id: AccountId,
        verified: bool,
        status: VerificationStatus,
        updated_at: Timestamp,
    ) -> Result<(), StoreError>;
}
