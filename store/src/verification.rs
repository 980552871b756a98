//! Verification request storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use xskill_types::{AccountId, RequestId, Timestamp, VerificationStatus};

/// The evidence an applicant attaches to a verification request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Evidence {
    pub degree_url: String,
    pub certification_urls: Vec<String>,
    pub experience_years: u32,
    pub expertise_areas: Vec<String>,
    pub additional_info: Option<String>,
}

/// A teacher verification request and its review outcome.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationRequestRecord {
    pub id: RequestId,
    pub account_id: AccountId,
    pub evidence: Evidence,
    pub status: VerificationStatus,
    pub reviewer_id: Option<AccountId>,
    pub review_notes: Option<String>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Seed for inserting a new request; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewVerificationRequest {
    pub account_id: AccountId,
    pub evidence: Evidence,
    pub created_at: Timestamp,
}

/// Trait for verification request storage operations.
pub trait VerificationStore {
    fn insert_request(
        &self,
        new: NewVerificationRequest,
    ) -> Result<VerificationRequestRecord, StoreError>;
    fn get_request(&self, id: RequestId) -> Result<VerificationRequestRecord, StoreError>;
    fn put_request(&self, record: &VerificationRequestRecord) -> Result<(), StoreError>;

    /// The account's outstanding `Pending` request, if one exists. At most
    /// one can be outstanding at a time.
    fn pending_request_for(
        &self,
        account: AccountId,
    ) -> Result<Option<VerificationRequestRecord>, StoreError>;

    fn requests_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<VerificationRequestRecord>, StoreError>;
}
