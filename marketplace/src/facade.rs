//! The marketplace facade.
//!
//! Each public method is one atomic use case. Money movement goes through
//! an escrow account: booking moves the learner's credits into escrow,
//! cancellation and no-show move them back, completion pays them out to the
//! teacher. Every leg is a ledger transfer, so the ledger stays zero-sum
//! across the learner, escrow, and teacher.

use std::sync::Arc;

use serde_json::json;

use crate::context::RequestContext;
use crate::error::MarketError;
use crate::event::{EventBus, MarketEvent};
use crate::notify::{Notification, Notifier};
use xskill_ledger::CreditLedger;
use xskill_sessions::{CompletionInput, SessionMachine};
use xskill_store::account::{AccountRecord, AccountStore, NewAccount};
use xskill_store::ledger::{LedgerEntryRecord, LedgerStore};
use xskill_store::offering::{OfferingRecord, OfferingStore};
use xskill_store::session::{NewSession, SessionRecord, SessionStore};
use xskill_store::verification::{Evidence, VerificationRequestRecord, VerificationStore};
use xskill_types::{
    AccountId, Credits, EntryKind, MarketParams, OfferingId, RequestId, Role, SessionId,
    Timestamp,
};
use xskill_verification::{ReviewDecision, VerificationWorkflow};
use xskill_xscore::ScoreEngine;

/// The full set of repositories the facade composes over.
pub trait MarketStore:
    AccountStore + OfferingStore + SessionStore + LedgerStore + VerificationStore
{
}

impl<T> MarketStore for T where
    T: AccountStore + OfferingStore + SessionStore + LedgerStore + VerificationStore
{
}

/// A learner's booking request.
#[derive(Clone, Debug)]
pub struct BookSessionRequest {
    pub offering_id: OfferingId,
    pub teacher_id: AccountId,
    pub scheduled_at: Timestamp,
    /// Defaults to the offering's standard duration when absent.
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

/// Ratings and feedback attached when a party completes a session.
#[derive(Clone, Debug, Default)]
pub struct CompleteSessionRequest {
    pub rating: Option<u8>,
    pub feedback: Option<String>,
    pub notes: Option<String>,
}

/// The marketplace core. One instance owns the engines for the lifetime of
/// the deployment; request handlers share it behind an `Arc`.
pub struct Marketplace<S, N> {
    store: Arc<S>,
    params: MarketParams,
    ledger: CreditLedger<S>,
    verification: VerificationWorkflow<S>,
    sessions: SessionMachine<S>,
    scores: ScoreEngine<S>,
    events: EventBus,
    notifier: N,
    escrow: AccountId,
}

impl<S, N> Marketplace<S, N>
where
    S: MarketStore,
    N: Notifier,
{
    /// Build the facade over a fresh store, creating the escrow account
    /// that holds booked credits between debit and settlement.
    pub fn new(store: Arc<S>, params: MarketParams, notifier: N) -> Result<Self, MarketError> {
        let escrow = store
            .insert_account(NewAccount {
                display_name: "escrow".into(),
                role: Role::Swapper,
                created_at: Timestamp::now(),
            })?
            .id;
        Ok(Self {
            ledger: CreditLedger::new(Arc::clone(&store)),
            verification: VerificationWorkflow::new(Arc::clone(&store)),
            sessions: SessionMachine::new(Arc::clone(&store)),
            scores: ScoreEngine::new(Arc::clone(&store)),
            events: EventBus::new(),
            store,
            params,
            notifier,
            escrow,
        })
    }

    /// Register an event listener. Call during wiring, before the facade is
    /// shared across request handlers.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&MarketEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    pub fn params(&self) -> &MarketParams {
        &self.params
    }

    // ── Use cases ────────────────────────────────────────────────────────

    /// Book a session with a verified teacher. The gate and argument checks
    /// run before any credits move; the learner's debit lands before the
    /// session row exists and is compensated if the insert fails, so the
    /// caller observes all-or-nothing.
    pub fn book_session(
        &self,
        ctx: &RequestContext,
        request: BookSessionRequest,
    ) -> Result<SessionRecord, MarketError> {
        let learner = ctx.actor;
        let offering = self.store.get_offering(request.offering_id)?;
        let duration = request
            .duration_minutes
            .unwrap_or(offering.duration_minutes);

        if !self.verification.can_teach(request.teacher_id)? {
            return Err(MarketError::NotVerified(request.teacher_id));
        }
        self.sessions.validate_booking(
            &self.params,
            request.teacher_id,
            learner,
            request.scheduled_at,
            duration,
            ctx.now,
        )?;

        let cost = Credits::new(self.params.session_cost(duration));
        self.ledger.transfer(
            learner,
            self.escrow,
            cost,
            None,
            EntryKind::Spent,
            EntryKind::Earned,
            Some(format!("booking: {}", offering.title)),
            ctx.now,
        )?;

        let session = match self.sessions.book(
            &self.params,
            NewSession {
                offering_id: offering.id,
                teacher_id: request.teacher_id,
                learner_id: learner,
                scheduled_at: request.scheduled_at,
                duration_minutes: duration,
                cost: cost.raw(),
                learner_notes: request.notes,
                created_at: ctx.now,
            },
            ctx.now,
        ) {
            Ok(session) => session,
            Err(err) => {
                // Put the debited credits back before reporting the failure.
                self.ledger.transfer(
                    self.escrow,
                    learner,
                    cost,
                    None,
                    EntryKind::Spent,
                    EntryKind::Bonus,
                    Some("booking reversal".into()),
                    ctx.now,
                )?;
                return Err(err.into());
            }
        };
        self.store.record_enrollment(offering.id, ctx.now)?;

        self.events.emit(&MarketEvent::SessionBooked {
            session: session.id,
            teacher: session.teacher_id,
            learner,
            cost: cost.raw(),
        });
        self.dispatch(
            Notification::new(
                session.teacher_id,
                "New session booked",
                format!("A learner booked \"{}\". Please confirm.", offering.title),
            )
            .with_payload(json!({ "session_id": session.id.raw() })),
        );
        Ok(session)
    }

    /// Teacher accepts a pending booking.
    pub fn confirm_session(
        &self,
        ctx: &RequestContext,
        session_id: SessionId,
        meeting_link: Option<String>,
    ) -> Result<SessionRecord, MarketError> {
        let session = self
            .sessions
            .confirm(session_id, ctx.actor, meeting_link, ctx.now)?;

        self.events
            .emit(&MarketEvent::SessionConfirmed { session: session.id });
        self.dispatch(
            Notification::new(
                session.learner_id,
                "Session confirmed",
                "Your teacher confirmed the session.",
            )
            .with_payload(json!({ "session_id": session.id.raw() })),
        );
        Ok(session)
    }

    /// Either party cancels a live session. The learner is always refunded
    /// in full; cancelling after the teacher confirmed costs the canceller
    /// reputation.
    pub fn cancel_session(
        &self,
        ctx: &RequestContext,
        session_id: SessionId,
        reason: Option<String>,
    ) -> Result<SessionRecord, MarketError> {
        let outcome = self
            .sessions
            .cancel(session_id, ctx.actor, reason, ctx.now)?;
        let session = &outcome.session;

        self.ledger.transfer(
            self.escrow,
            session.learner_id,
            Credits::new(session.cost),
            Some(session.id),
            EntryKind::Spent,
            EntryKind::Bonus,
            Some("cancellation refund".into()),
            ctx.now,
        )?;
        if outcome.was_confirmed {
            self.refresh_score(ctx.actor, ctx.now)?;
        }

        self.events.emit(&MarketEvent::SessionCancelled {
            session: session.id,
            by: ctx.actor,
            was_confirmed: outcome.was_confirmed,
            refunded: session.cost,
        });
        let counterparty = if ctx.actor == session.learner_id {
            session.teacher_id
        } else {
            session.learner_id
        };
        self.dispatch(
            Notification::new(
                counterparty,
                "Session cancelled",
                "The other party cancelled your session.",
            )
            .with_payload(json!({ "session_id": session.id.raw() })),
        );
        Ok(outcome.session)
    }

    /// Either party marks a confirmed, already-held session complete. Pays
    /// the escrowed credits out to the teacher, updates the offering stats,
    /// and refreshes both parties' scores.
    pub fn complete_session(
        &self,
        ctx: &RequestContext,
        session_id: SessionId,
        request: CompleteSessionRequest,
    ) -> Result<SessionRecord, MarketError> {
        let session = self.sessions.complete(
            session_id,
            ctx.actor,
            CompletionInput {
                rating: request.rating,
                feedback: request.feedback,
                notes: request.notes,
            },
            ctx.now,
        )?;

        self.ledger.transfer(
            self.escrow,
            session.teacher_id,
            Credits::new(session.cost),
            Some(session.id),
            EntryKind::Spent,
            EntryKind::Earned,
            Some("session payout".into()),
            ctx.now,
        )?;
        self.store
            .record_completion(session.offering_id, session.learner_rating, ctx.now)?;
        self.refresh_score(session.teacher_id, ctx.now)?;
        self.refresh_score(session.learner_id, ctx.now)?;

        self.events.emit(&MarketEvent::SessionCompleted {
            session: session.id,
            teacher: session.teacher_id,
            learner: session.learner_id,
            amount: session.cost,
            learner_rating: session.learner_rating,
        });
        self.dispatch(
            Notification::new(
                session.teacher_id,
                "Session completed",
                format!("You earned {} credits.", session.cost),
            )
            .with_payload(json!({ "session_id": session.id.raw() })),
        );
        Ok(session)
    }

    /// Teacher reports the learner never showed. No payout; the learner's
    /// escrowed credits come back, and the teacher takes the reliability
    /// hit by convention.
    pub fn mark_no_show(
        &self,
        ctx: &RequestContext,
        session_id: SessionId,
    ) -> Result<SessionRecord, MarketError> {
        let session = self.sessions.mark_no_show(session_id, ctx.actor, ctx.now)?;

        self.ledger.transfer(
            self.escrow,
            session.learner_id,
            Credits::new(session.cost),
            Some(session.id),
            EntryKind::Spent,
            EntryKind::Bonus,
            Some("no-show refund".into()),
            ctx.now,
        )?;
        self.refresh_score(session.teacher_id, ctx.now)?;

        self.events.emit(&MarketEvent::SessionNoShow {
            session: session.id,
            teacher: session.teacher_id,
            learner: session.learner_id,
            refunded: session.cost,
        });
        self.dispatch(
            Notification::new(
                session.learner_id,
                "Session marked as no-show",
                "Your credits were refunded.",
            )
            .with_payload(json!({ "session_id": session.id.raw() })),
        );
        Ok(session)
    }

    /// Submit teacher verification evidence for review.
    pub fn submit_verification(
        &self,
        ctx: &RequestContext,
        evidence: Evidence,
    ) -> Result<VerificationRequestRecord, MarketError> {
        let request = self
            .verification
            .submit(ctx.actor, evidence, &self.params, ctx.now)?;

        self.events.emit(&MarketEvent::VerificationSubmitted {
            request: request.id,
            account: ctx.actor,
        });
        self.dispatch(Notification::new(
            ctx.actor,
            "Verification received",
            "Your teacher verification request is under review.",
        ));
        Ok(request)
    }

    /// Decide a pending verification request.
    pub fn review_verification(
        &self,
        ctx: &RequestContext,
        request_id: RequestId,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> Result<VerificationRequestRecord, MarketError> {
        let request =
            self.verification
                .review(request_id, decision, ctx.actor, notes, ctx.now)?;
        let approved = decision == ReviewDecision::Approve;

        self.events.emit(&MarketEvent::VerificationReviewed {
            request: request.id,
            account: request.account_id,
            approved,
        });
        self.dispatch(Notification::new(
            request.account_id,
            if approved {
                "Verification approved"
            } else {
                "Verification rejected"
            },
            if approved {
                "You can now teach on the marketplace."
            } else {
                "Your request was not approved. You may resubmit with more evidence."
            },
        ));
        Ok(request)
    }

    /// Grant credits outside the session flow: signup bonuses, subscription
    /// allowances, administrative adjustments.
    pub fn grant_credits(
        &self,
        ctx: &RequestContext,
        account: AccountId,
        amount: Credits,
        kind: EntryKind,
        description: Option<String>,
    ) -> Result<LedgerEntryRecord, MarketError> {
        Ok(self
            .ledger
            .credit(account, amount, kind, None, description, ctx.now)?)
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn balance(&self, account: AccountId) -> Result<Credits, MarketError> {
        Ok(self.ledger.balance(account)?)
    }

    pub fn entries(&self, account: AccountId) -> Result<Vec<LedgerEntryRecord>, MarketError> {
        Ok(self.ledger.entries(account)?)
    }

    pub fn account(&self, account: AccountId) -> Result<AccountRecord, MarketError> {
        Ok(self.store.get_account(account)?)
    }

    pub fn session(&self, session_id: SessionId) -> Result<SessionRecord, MarketError> {
        Ok(self.sessions.get(session_id)?)
    }

    pub fn offering(&self, offering_id: OfferingId) -> Result<OfferingRecord, MarketError> {
        Ok(self.store.get_offering(offering_id)?)
    }

    /// Re-derive an account's XScore from history without storing it.
    pub fn xscore(&self, account: AccountId) -> Result<f64, MarketError> {
        Ok(self.scores.recompute(account, &self.params)?)
    }

    // ── Internals ────────────────────────────────────────────────────────

    /// Recompute and persist one account's score.
    fn refresh_score(&self, account: AccountId, now: Timestamp) -> Result<(), MarketError> {
        let score = self.scores.recompute(account, &self.params)?;
        self.store.set_x_score(account, score, now)?;
        Ok(())
    }

    /// Fire-and-forget notification dispatch, after the use case committed.
    /// Failures are logged and swallowed; the transaction stands.
    fn dispatch(&self, notification: Notification) {
        if let Err(err) = self.notifier.deliver(&notification) {
            tracing::warn!(
                account = %notification.account,
                subject = %notification.subject,
                error = %err,
                "notification dispatch failed"
            );
        }
    }
}
