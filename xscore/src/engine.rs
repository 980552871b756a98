//! The XScore computation engine.

use std::sync::Arc;

use crate::error::ScoreError;
use xskill_store::account::AccountStore;
use xskill_store::session::{SessionRecord, SessionStore};
use xskill_types::{AccountId, MarketParams, SessionStatus};

/// One scored signal extracted from a terminal session: a weight and a
/// value on the 0..=10 scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Signal {
    pub weight: f64,
    pub value: f64,
}

/// Recomputes reputation from session history.
pub struct ScoreEngine<S> {
    store: Arc<S>,
}

impl<S> ScoreEngine<S>
where
    S: SessionStore + AccountStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Derive the account's score from its full terminal session history.
    ///
    /// Idempotent: the same history always folds to the same value, so the
    /// stored score can be re-derived at any time for auditing.
    pub fn recompute(
        &self,
        account: AccountId,
        params: &MarketParams,
    ) -> Result<f64, ScoreError> {
        // The account must exist even if it has no history.
        self.store.get_account(account)?;

        let sessions = self.store.sessions_for_account(account)?;
        let signals = sessions
            .iter()
            .filter_map(|s| signal_for(account, s, params));
        let score = fold_signals(signals);
        tracing::trace!(account = %account, score, "xscore recomputed");
        Ok(score)
    }
}

/// The signal `session` contributes to `account`'s score, if any.
fn signal_for(
    account: AccountId,
    session: &SessionRecord,
    params: &MarketParams,
) -> Option<Signal> {
    let teach = session.teacher_id == account;
    match session.status {
        SessionStatus::Completed => {
            let (weight_bps, rating) = if teach {
                // Teaching is scored by the learner's rating of the session.
                (params.teach_weight_bps, session.learner_rating)
            } else {
                (params.learn_weight_bps, session.teacher_rating)
            };
            let value = match rating {
                Some(r) => f64::from(r) * 2.0,
                None => f64::from(params.unrated_session_value_bps) / 1_000.0,
            };
            Some(Signal {
                weight: f64::from(weight_bps) / 10_000.0,
                value,
            })
        }
        // A no-show is the teacher's reliability failure.
        SessionStatus::NoShow if teach => Some(Signal {
            weight: f64::from(params.reliability_weight_bps) / 10_000.0,
            value: 0.0,
        }),
        // Backing out after the teacher confirmed costs the canceller.
        SessionStatus::Cancelled
            if session.cancelled_by == Some(account) && session.confirmed_at.is_some() =>
        {
            Some(Signal {
                weight: f64::from(params.reliability_weight_bps) / 10_000.0,
                value: 0.0,
            })
        }
        _ => None,
    }
}

/// Weighted average of the signals, clamped to the score scale. No signals
/// means no reputation yet: zero.
fn fold_signals(signals: impl Iterator<Item = Signal>) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for signal in signals {
        weighted_sum += signal.weight * signal.value;
        weight_total += signal.weight;
    }
    if weight_total == 0.0 {
        return 0.0;
    }
    (weighted_sum / weight_total).clamp(0.0, MarketParams::XSCORE_MAX)
}
