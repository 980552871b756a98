//! Offering storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use xskill_types::{Difficulty, OfferingId, Timestamp};

/// A teachable unit bookable into sessions.
///
/// Read-mostly from the core's perspective; the aggregate stats move only as
/// side effects of booking and completion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OfferingRecord {
    pub id: OfferingId,
    pub title: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub enrollments: u64,
    pub completions: u64,
    /// Rolling mean of learner ratings on completed sessions, 0.0 when
    /// nothing has been rated yet.
    pub average_rating: f64,
    /// Number of ratings folded into `average_rating`.
    pub rating_count: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Seed for inserting a new offering; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewOffering {
    pub title: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub created_at: Timestamp,
}

/// Trait for offering storage operations.
///
/// Stat updates are focused increments, applied atomically by the backend,
/// so concurrent bookings and completions never lose counts to a
/// read-modify-write race.
pub trait OfferingStore {
    fn insert_offering(&self, new: NewOffering) -> Result<OfferingRecord, StoreError>;
    fn get_offering(&self, id: OfferingId) -> Result<OfferingRecord, StoreError>;

    /// `enrollments += 1`.
    fn record_enrollment(&self, id: OfferingId, now: Timestamp) -> Result<(), StoreError>;

    /// `completions += 1`; folds `rating` into the rolling average when given.
    fn record_completion(
        &self,
        id: OfferingId,
        rating: Option<u8>,
        now: Timestamp,
    ) -> Result<(), StoreError>;
}
