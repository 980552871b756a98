//! Marketplace parameters — every tunable rule the core consults.
//!
//! Fractional weights are basis points (10000 = 1.0) so all scoring
//! arithmetic stays in integers until the final division.

use serde::{Deserialize, Serialize};

/// Tunable marketplace rules consulted by the engines.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketParams {
    // ── Credit cost ──────────────────────────────────────────────────────
    /// Minutes of session time bought by one credit. The cost of a session
    /// is one credit per *started* block: a 31-minute session with the
    /// default block costs 2 credits.
    pub credit_block_minutes: u32,

    // ── Session bounds ───────────────────────────────────────────────────
    /// Shortest bookable session.
    pub min_session_minutes: u32,
    /// Longest bookable session.
    pub max_session_minutes: u32,

    /// Window after booking within which a pending session should be
    /// confirmed. The core has no timers; an external sweep reads this and
    /// cancels overdue bookings through the facade.
    pub pending_confirm_window_secs: u64,

    // ── Verification ─────────────────────────────────────────────────────
    /// Upper bound accepted for claimed years of experience.
    pub max_experience_years: u32,

    // ── XScore ───────────────────────────────────────────────────────────
    /// Weight of a completed session taught by the account (basis points).
    pub teach_weight_bps: u32,
    /// Weight of a completed session attended as learner (basis points).
    pub learn_weight_bps: u32,
    /// Weight of a reliability failure — a no-show as teacher or a
    /// cancellation after confirmation (basis points).
    pub reliability_weight_bps: u32,
    /// Score value, in basis points of the 10-point scale, contributed by a
    /// completed session that received no rating.
    pub unrated_session_value_bps: u32,
}

impl MarketParams {
    /// Upper end of the XScore scale.
    pub const XSCORE_MAX: f64 = 10.0;

    /// XSkill marketplace defaults.
    pub fn xskill_defaults() -> Self {
        Self {
            credit_block_minutes: 30,

            min_session_minutes: 30,
            max_session_minutes: 180,
            pending_confirm_window_secs: 48 * 3600, // 2 days

            max_experience_years: 50,

            teach_weight_bps: 10_000,          // 1.0
            learn_weight_bps: 4_000,           // 0.4
            reliability_weight_bps: 15_000,    // 1.5
            unrated_session_value_bps: 7_000,  // 7.0 of 10
        }
    }

    /// Credit cost of a session: one credit per started block.
    pub fn session_cost(&self, duration_minutes: u32) -> u64 {
        let block = self.credit_block_minutes.max(1);
        (u64::from(duration_minutes) + u64::from(block) - 1) / u64::from(block)
    }

    /// Whether a requested duration is bookable.
    pub fn duration_in_bounds(&self, duration_minutes: u32) -> bool {
        duration_minutes >= self.min_session_minutes
            && duration_minutes <= self.max_session_minutes
    }
}

/// Default is the XSkill marketplace configuration.
impl Default for MarketParams {
    fn default() -> Self {
        Self::xskill_defaults()
    }
}
