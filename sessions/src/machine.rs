//! The session state machine engine.

use std::sync::Arc;

use crate::error::SessionError;
use crate::transition;
use xskill_store::session::{NewSession, SessionRecord, SessionStore};
use xskill_types::{AccountId, MarketParams, SessionId, SessionStatus, Timestamp};

/// Ratings and feedback supplied at completion, applied to the acting
/// party's side of the record.
#[derive(Clone, Debug, Default)]
pub struct CompletionInput {
    pub rating: Option<u8>,
    pub feedback: Option<String>,
    pub notes: Option<String>,
}

/// A cancellation plus what the session looked like before it.
#[derive(Clone, Debug)]
pub struct CancelOutcome {
    pub session: SessionRecord,
    /// Whether the teacher had already confirmed; cancellations after
    /// confirmation carry a reliability penalty for the canceller.
    pub was_confirmed: bool,
}

/// Drives a session through its lifecycle. Every transition is written with
/// a compare-and-swap on the record version; a lost race surfaces as
/// [`SessionError::InvalidState`] carrying the status that won.
pub struct SessionMachine<S> {
    store: Arc<S>,
}

impl<S> SessionMachine<S>
where
    S: SessionStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Validate booking arguments without touching the store. The facade
    /// runs this before it debits the learner so an invalid booking never
    /// moves credits.
    pub fn validate_booking(
        &self,
        params: &MarketParams,
        teacher: AccountId,
        learner: AccountId,
        scheduled_at: Timestamp,
        duration_minutes: u32,
        now: Timestamp,
    ) -> Result<(), SessionError> {
        if teacher == learner {
            return Err(SessionError::SelfBooking);
        }
        if !scheduled_at.is_future(now) {
            return Err(SessionError::ScheduleNotFuture);
        }
        if !params.duration_in_bounds(duration_minutes) {
            return Err(SessionError::DurationOutOfBounds {
                minutes: duration_minutes,
                min: params.min_session_minutes,
                max: params.max_session_minutes,
            });
        }
        Ok(())
    }

    /// Insert a freshly validated booking in status `pending`.
    pub fn book(
        &self,
        params: &MarketParams,
        new: NewSession,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionError> {
        self.validate_booking(
            params,
            new.teacher_id,
            new.learner_id,
            new.scheduled_at,
            new.duration_minutes,
            now,
        )?;
        let session = self.store.insert_session(new)?;
        tracing::info!(
            session = %session.id,
            teacher = %session.teacher_id,
            learner = %session.learner_id,
            "session booked"
        );
        Ok(session)
    }

    /// Teacher accepts a pending booking, optionally attaching the meeting
    /// link.
    pub fn confirm(
        &self,
        session_id: SessionId,
        actor: AccountId,
        meeting_link: Option<String>,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionError> {
        let mut session = self.store.get_session(session_id)?;
        if actor != session.teacher_id {
            return Err(SessionError::Forbidden {
                actor: actor.to_string(),
                action: "confirm",
            });
        }
        self.ensure_transition(&session, SessionStatus::Confirmed, "confirm")?;

        session.status = SessionStatus::Confirmed;
        session.confirmed_at = Some(now);
        if meeting_link.is_some() {
            session.meeting_link = meeting_link;
        }
        session.updated_at = now;
        self.write(session, "confirm")
    }

    /// Either party backs out of a live session.
    pub fn cancel(
        &self,
        session_id: SessionId,
        actor: AccountId,
        reason: Option<String>,
        now: Timestamp,
    ) -> Result<CancelOutcome, SessionError> {
        let mut session = self.store.get_session(session_id)?;
        if !session.is_party(actor) {
            return Err(SessionError::Forbidden {
                actor: actor.to_string(),
                action: "cancel",
            });
        }
        self.ensure_transition(&session, SessionStatus::Cancelled, "cancel")?;

        let was_confirmed = session.status == SessionStatus::Confirmed;
        session.status = SessionStatus::Cancelled;
        session.cancelled_by = Some(actor);
        session.cancellation_reason = reason;
        session.updated_at = now;
        let session = self.write(session, "cancel")?;
        Ok(CancelOutcome {
            session,
            was_confirmed,
        })
    }

    /// Either party marks a confirmed, already-held session as completed,
    /// attaching their rating and feedback.
    pub fn complete(
        &self,
        session_id: SessionId,
        actor: AccountId,
        input: CompletionInput,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionError> {
        if let Some(rating) = input.rating {
            if !(1..=5).contains(&rating) {
                return Err(SessionError::InvalidRating(rating));
            }
        }
        let mut session = self.store.get_session(session_id)?;
        if !session.is_party(actor) {
            return Err(SessionError::Forbidden {
                actor: actor.to_string(),
                action: "complete",
            });
        }
        self.ensure_transition(&session, SessionStatus::Completed, "complete")?;
        if !session.scheduled_at.has_passed(now) {
            return Err(SessionError::NotYetHeld(session_id.to_string()));
        }

        if actor == session.learner_id {
            session.learner_rating = input.rating;
            session.learner_feedback = input.feedback;
            if input.notes.is_some() {
                session.learner_notes = input.notes;
            }
        } else {
            session.teacher_rating = input.rating;
            session.teacher_feedback = input.feedback;
            if input.notes.is_some() {
                session.teacher_notes = input.notes;
            }
        }
        session.status = SessionStatus::Completed;
        session.updated_at = now;
        self.write(session, "complete")
    }

    /// Teacher records that the meeting never happened.
    pub fn mark_no_show(
        &self,
        session_id: SessionId,
        actor: AccountId,
        now: Timestamp,
    ) -> Result<SessionRecord, SessionError> {
        let mut session = self.store.get_session(session_id)?;
        if actor != session.teacher_id {
            return Err(SessionError::Forbidden {
                actor: actor.to_string(),
                action: "mark no-show on",
            });
        }
        self.ensure_transition(&session, SessionStatus::NoShow, "mark no-show on")?;

        session.status = SessionStatus::NoShow;
        session.updated_at = now;
        self.write(session, "mark no-show on")
    }

    pub fn get(&self, session_id: SessionId) -> Result<SessionRecord, SessionError> {
        Ok(self.store.get_session(session_id)?)
    }

    fn ensure_transition(
        &self,
        session: &SessionRecord,
        to: SessionStatus,
        action: &'static str,
    ) -> Result<(), SessionError> {
        if !transition::allowed(session.status, to) {
            return Err(SessionError::InvalidState {
                session: session.id.to_string(),
                status: session.status,
                action,
            });
        }
        Ok(())
    }

    /// Compare-and-swap write. A version conflict means another transition
    /// landed first; re-read and report the state that won.
    fn write(
        &self,
        session: SessionRecord,
        action: &'static str,
    ) -> Result<SessionRecord, SessionError> {
        let expected = session.version;
        match self.store.update_session(&session, expected) {
            Ok(stored) => Ok(stored),
            Err(xskill_store::StoreError::VersionConflict { .. }) => {
                let current = self.store.get_session(session.id)?;
                tracing::debug!(
                    session = %session.id,
                    status = %current.status,
                    "lost transition race"
                );
                Err(SessionError::InvalidState {
                    session: session.id.to_string(),
                    status: current.status,
                    action,
                })
            }
            Err(other) => Err(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xskill_store::NewAccount;
    use xskill_store::{AccountStore, NewOffering, OfferingStore};
    use xskill_store_memory::MemoryStore;
    use xskill_types::{Difficulty, Role};

    struct Fixture {
        machine: SessionMachine<MemoryStore>,
        params: MarketParams,
        teacher: AccountId,
        learner: AccountId,
        session: SessionId,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let teacher = store
            .insert_account(NewAccount {
                display_name: "t".into(),
                role: Role::Teacher,
                created_at: Timestamp::new(100),
            })
            .unwrap()
            .id;
        let learner = store
            .insert_account(NewAccount {
                display_name: "l".into(),
                role: Role::Learner,
                created_at: Timestamp::new(100),
            })
            .unwrap()
            .id;
        let offering = store
            .insert_offering(NewOffering {
                title: "Watercolors".into(),
                category: "art".into(),
                difficulty: Difficulty::Beginner,
                duration_minutes: 60,
                created_at: Timestamp::new(100),
            })
            .unwrap()
            .id;
        let machine = SessionMachine::new(Arc::clone(&store));
        let params = MarketParams::xskill_defaults();
        let session = machine
            .book(
                &params,
                NewSession {
                    offering_id: offering,
                    teacher_id: teacher,
                    learner_id: learner,
                    scheduled_at: Timestamp::new(5000),
                    duration_minutes: 60,
                    cost: 2,
                    learner_notes: None,
                    created_at: Timestamp::new(1000),
                },
                Timestamp::new(1000),
            )
            .unwrap()
            .id;
        Fixture {
            machine,
            params,
            teacher,
            learner,
            session,
        }
    }

    #[test]
    fn booking_validations() {
        let f = fixture();
        let now = Timestamp::new(1000);

        assert!(matches!(
            f.machine
                .validate_booking(&f.params, f.teacher, f.teacher, Timestamp::new(2000), 60, now),
            Err(SessionError::SelfBooking)
        ));
        assert!(matches!(
            f.machine
                .validate_booking(&f.params, f.teacher, f.learner, Timestamp::new(1000), 60, now),
            Err(SessionError::ScheduleNotFuture)
        ));
        assert!(matches!(
            f.machine
                .validate_booking(&f.params, f.teacher, f.learner, Timestamp::new(2000), 20, now),
            Err(SessionError::DurationOutOfBounds { .. })
        ));
    }

    #[test]
    fn only_the_teacher_confirms() {
        let f = fixture();
        let err = f
            .machine
            .confirm(f.session, f.learner, None, Timestamp::new(1100))
            .unwrap_err();
        assert!(matches!(err, SessionError::Forbidden { .. }));

        let confirmed = f
            .machine
            .confirm(
                f.session,
                f.teacher,
                Some("https://meet.example.com/abc".into()),
                Timestamp::new(1100),
            )
            .unwrap();
        assert_eq!(confirmed.status, SessionStatus::Confirmed);
        assert_eq!(confirmed.confirmed_at, Some(Timestamp::new(1100)));
        assert!(confirmed.meeting_link.is_some());
    }

    #[test]
    fn confirm_twice_is_invalid_state() {
        let f = fixture();
        f.machine
            .confirm(f.session, f.teacher, None, Timestamp::new(1100))
            .unwrap();
        let err = f
            .machine
            .confirm(f.session, f.teacher, None, Timestamp::new(1101))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidState {
                status: SessionStatus::Confirmed,
                ..
            }
        ));
    }

    #[test]
    fn outsiders_cannot_cancel() {
        let f = fixture();
        let err = f
            .machine
            .cancel(f.session, AccountId::new(999), None, Timestamp::new(1100))
            .unwrap_err();
        assert!(matches!(err, SessionError::Forbidden { .. }));
    }

    #[test]
    fn cancel_records_who_and_whether_confirmed() {
        let f = fixture();
        f.machine
            .confirm(f.session, f.teacher, None, Timestamp::new(1100))
            .unwrap();
        let outcome = f
            .machine
            .cancel(
                f.session,
                f.learner,
                Some("conflict came up".into()),
                Timestamp::new(1200),
            )
            .unwrap();
        assert!(outcome.was_confirmed);
        assert_eq!(outcome.session.cancelled_by, Some(f.learner));
        assert_eq!(outcome.session.status, SessionStatus::Cancelled);
    }

    #[test]
    fn complete_requires_confirmed_and_past_schedule() {
        let f = fixture();
        // Not yet confirmed.
        let err = f
            .machine
            .complete(
                f.session,
                f.learner,
                CompletionInput::default(),
                Timestamp::new(6000),
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidState { .. }));

        f.machine
            .confirm(f.session, f.teacher, None, Timestamp::new(1100))
            .unwrap();

        // Confirmed but the meeting is still in the future.
        let err = f
            .machine
            .complete(
                f.session,
                f.learner,
                CompletionInput::default(),
                Timestamp::new(2000),
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::NotYetHeld(_)));

        let completed = f
            .machine
            .complete(
                f.session,
                f.learner,
                CompletionInput {
                    rating: Some(5),
                    feedback: Some("great session".into()),
                    notes: None,
                },
                Timestamp::new(6000),
            )
            .unwrap();
        assert_eq!(completed.status, SessionStatus::Completed);
        assert_eq!(completed.learner_rating, Some(5));
        assert_eq!(completed.teacher_rating, None);
    }

    #[test]
    fn rating_bounds_are_enforced() {
        let f = fixture();
        f.machine
            .confirm(f.session, f.teacher, None, Timestamp::new(1100))
            .unwrap();
        let err = f
            .machine
            .complete(
                f.session,
                f.learner,
                CompletionInput {
                    rating: Some(6),
                    ..Default::default()
                },
                Timestamp::new(6000),
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidRating(6)));
    }

    #[test]
    fn no_show_is_teacher_only_from_confirmed() {
        let f = fixture();
        let err = f
            .machine
            .mark_no_show(f.session, f.teacher, Timestamp::new(6000))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidState { .. }));

        f.machine
            .confirm(f.session, f.teacher, None, Timestamp::new(1100))
            .unwrap();
        let err = f
            .machine
            .mark_no_show(f.session, f.learner, Timestamp::new(6000))
            .unwrap_err();
        assert!(matches!(err, SessionError::Forbidden { .. }));

        let marked = f
            .machine
            .mark_no_show(f.session, f.teacher, Timestamp::new(6000))
            .unwrap();
        assert_eq!(marked.status, SessionStatus::NoShow);
    }

    #[test]
    fn terminal_states_reject_everything() {
        let f = fixture();
        let outcome = f
            .machine
            .cancel(f.session, f.learner, None, Timestamp::new(1100))
            .unwrap();
        assert_eq!(outcome.session.status, SessionStatus::Cancelled);

        assert!(matches!(
            f.machine.confirm(f.session, f.teacher, None, Timestamp::new(1200)),
            Err(SessionError::InvalidState { .. })
        ));
        assert!(matches!(
            f.machine.cancel(f.session, f.learner, None, Timestamp::new(1200)),
            Err(SessionError::InvalidState { .. })
        ));
        assert!(matches!(
            f.machine.complete(
                f.session,
                f.learner,
                CompletionInput::default(),
                Timestamp::new(6000)
            ),
            Err(SessionError::InvalidState { .. })
        ));
    }

    #[test]
    fn concurrent_confirms_have_exactly_one_winner() {
        use std::thread;

        let f = fixture();
        let machine = Arc::new(f.machine);
        let mut handles = Vec::new();
        for _ in 0..2 {
            let machine = Arc::clone(&machine);
            let session = f.session;
            let teacher = f.teacher;
            handles.push(thread::spawn(move || {
                machine.confirm(session, teacher, None, Timestamp::new(1100))
            }));
        }
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        let loser = results.into_iter().find(|r| r.is_err()).unwrap();
        assert!(matches!(
            loser.unwrap_err(),
            SessionError::InvalidState { .. }
        ));
    }
}
