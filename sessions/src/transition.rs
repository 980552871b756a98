//! The session status transition table.

use xskill_types::SessionStatus;

/// Whether a direct transition between two statuses is legal.
///
/// No transition skips a state and nothing leaves a terminal state.
pub fn allowed(from: SessionStatus, to: SessionStatus) -> bool {
    use SessionStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed)
            | (Pending, Cancelled)
            | (Confirmed, Completed)
            | (Confirmed, Cancelled)
            | (Confirmed, NoShow)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionStatus::*;

    const ALL: [SessionStatus; 5] = [Pending, Confirmed, Completed, Cancelled, NoShow];

    #[test]
    fn terminal_states_have_no_exits() {
        for from in ALL.iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(!allowed(*from, to), "{from:?} -> {to:?} must be illegal");
            }
        }
    }

    #[test]
    fn no_skip_from_pending_to_completed() {
        assert!(!allowed(Pending, Completed));
        assert!(!allowed(Pending, NoShow));
    }

    #[test]
    fn live_paths_are_open() {
        assert!(allowed(Pending, Confirmed));
        assert!(allowed(Pending, Cancelled));
        assert!(allowed(Confirmed, Completed));
        assert!(allowed(Confirmed, Cancelled));
        assert!(allowed(Confirmed, NoShow));
    }
}
