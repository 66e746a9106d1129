use crate::error::app_error::AppError;
use crate::models::session::{Cancellation, Session, SessionAction, SessionStatus};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Time inputs for evaluating a transition.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext {
    /// Wall-clock time in the zone session times are expressed in.
    pub local_now: NaiveDateTime,
    pub now: DateTime<Utc>,
    pub start_tolerance: Duration,
}

/// Apply `action` to `session` according to the lifecycle table:
///
/// | action   | from                   | to          |
/// |----------|------------------------|-------------|
/// | confirm  | scheduled              | confirmed   |
/// | cancel   | scheduled, confirmed   | cancelled   |
/// | start    | confirmed              | in-progress |
/// | complete | in-progress            | completed   |
/// | no-show  | confirmed, in-progress | no-show     |
///
/// Requesting the status the session already has is a no-op.
pub fn apply_transition(session: &Session, action: SessionAction, ctx: &TransitionContext) -> Result<Session, AppError> {
    let from = session.status;
    if from == action.target() {
        return Ok(session.clone());
    }

    let starts_at = session.starts_at();
    let mut next = session.clone();

    match (action, from) {
        (SessionAction::Confirm { by }, SessionStatus::Scheduled) => {
            if by == session.initiated_by {
                return Err(AppError::illegal_because(
                    from,
                    action.name(),
                    format!("the {} has to accept a booking made by the {by}", by.counterparty()),
                ));
            }
        }
        (SessionAction::Cancel { by }, SessionStatus::Scheduled | SessionStatus::Confirmed) => {
            next.cancellation = Some(Cancellation {
                by,
                at: ctx.now,
                late: ctx.local_now >= starts_at,
            });
        }
        (SessionAction::Start, SessionStatus::Confirmed) => {
            let offset = ctx.local_now - starts_at;
            if offset.abs() > ctx.start_tolerance {
                return Err(AppError::OutOfWindow(format!(
                    "Session starts at {starts_at}; it can only be started within {} minutes of that",
                    ctx.start_tolerance.num_minutes()
                )));
            }
        }
        (SessionAction::Complete, SessionStatus::InProgress) => {}
        (SessionAction::NoShow, SessionStatus::InProgress) => {}
        (SessionAction::NoShow, SessionStatus::Confirmed) => {
            if ctx.local_now < starts_at {
                return Err(AppError::OutOfWindow(format!("Session has not started yet (starts at {starts_at})")));
            }
        }
        _ => return Err(AppError::illegal(from, action.name())),
    }

    next.status = action.target();
    next.updated_at = ctx.now;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::Party;
    use crate::test_utils::{at, monday, sample_session, sample_tutor};
    use chrono::TimeZone;

    fn ctx_at(hour: u32, minute: u32) -> TransitionContext {
        let local_now = at(monday(), hour, minute);
        TransitionContext {
            local_now,
            now: Utc.from_utc_datetime(&local_now),
            start_tolerance: Duration::minutes(15),
        }
    }

    fn session_in(status: SessionStatus) -> Session {
        Session {
            status,
            ..sample_session(&sample_tutor(), 14, 0, 60)
        }
    }

    fn all_actions() -> [SessionAction; 7] {
        [
            SessionAction::Confirm { by: Party::Tutor },
            SessionAction::Confirm { by: Party::Student },
            SessionAction::Cancel { by: Party::Student },
            SessionAction::Cancel { by: Party::Tutor },
            SessionAction::Start,
            SessionAction::Complete,
            SessionAction::NoShow,
        ]
    }

    fn is_legal(from: SessionStatus, action: SessionAction) -> bool {
        matches!(
            (action, from),
            (SessionAction::Confirm { .. }, SessionStatus::Scheduled)
                | (SessionAction::Cancel { .. }, SessionStatus::Scheduled | SessionStatus::Confirmed)
                | (SessionAction::Start, SessionStatus::Confirmed)
                | (SessionAction::Complete, SessionStatus::InProgress)
                | (SessionAction::NoShow, SessionStatus::Confirmed | SessionStatus::InProgress)
        )
    }

    #[test]
    fn counterparty_confirms() {
        let session = session_in(SessionStatus::Scheduled);
        let confirmed = apply_transition(&session, SessionAction::Confirm { by: Party::Tutor }, &ctx_at(9, 0)).unwrap();
        assert_eq!(confirmed.status, SessionStatus::Confirmed);
        assert_eq!(confirmed.updated_at, ctx_at(9, 0).now);
    }

    #[test]
    fn initiator_cannot_confirm_own_booking() {
        let session = session_in(SessionStatus::Scheduled);
        let result = apply_transition(&session, SessionAction::Confirm { by: Party::Student }, &ctx_at(9, 0));
        assert!(matches!(result, Err(AppError::IllegalTransition { reason: Some(_), .. })));
    }

    #[test]
    fn confirming_twice_is_a_no_op() {
        let session = session_in(SessionStatus::Confirmed);
        let again = apply_transition(&session, SessionAction::Confirm { by: Party::Student }, &ctx_at(9, 0)).unwrap();
        assert_eq!(again, session);
    }

    #[test]
    fn complete_from_scheduled_is_illegal() {
        let session = session_in(SessionStatus::Scheduled);
        let result = apply_transition(&session, SessionAction::Complete, &ctx_at(15, 0));
        assert!(matches!(
            result,
            Err(AppError::IllegalTransition {
                from: SessionStatus::Scheduled,
                action: "complete",
                ..
            })
        ));
    }

    #[test]
    fn start_respects_tolerance_window() {
        let session = session_in(SessionStatus::Confirmed);

        assert!(matches!(
            apply_transition(&session, SessionAction::Start, &ctx_at(13, 44)),
            Err(AppError::OutOfWindow(_))
        ));
        assert!(matches!(
            apply_transition(&session, SessionAction::Start, &ctx_at(14, 16)),
            Err(AppError::OutOfWindow(_))
        ));
        for (hour, minute) in [(13, 45), (14, 0), (14, 15)] {
            let started = apply_transition(&session, SessionAction::Start, &ctx_at(hour, minute)).unwrap();
            assert_eq!(started.status, SessionStatus::InProgress);
        }
    }

    #[test]
    fn cancellation_records_lateness() {
        let session = session_in(SessionStatus::Confirmed);

        let early = apply_transition(&session, SessionAction::Cancel { by: Party::Student }, &ctx_at(9, 0)).unwrap();
        let cancellation = early.cancellation.unwrap();
        assert_eq!(early.status, SessionStatus::Cancelled);
        assert_eq!(cancellation.by, Party::Student);
        assert!(!cancellation.late);

        let late = apply_transition(&session, SessionAction::Cancel { by: Party::Tutor }, &ctx_at(14, 5)).unwrap();
        assert!(late.cancellation.unwrap().late);
    }

    #[test]
    fn no_show_only_after_start() {
        let session = session_in(SessionStatus::Confirmed);
        assert!(matches!(
            apply_transition(&session, SessionAction::NoShow, &ctx_at(13, 0)),
            Err(AppError::OutOfWindow(_))
        ));
        let missed = apply_transition(&session, SessionAction::NoShow, &ctx_at(14, 20)).unwrap();
        assert_eq!(missed.status, SessionStatus::NoShow);
    }

    #[test]
    fn full_happy_path() {
        let session = session_in(SessionStatus::Scheduled);
        let session = apply_transition(&session, SessionAction::Confirm { by: Party::Tutor }, &ctx_at(9, 0)).unwrap();
        let session = apply_transition(&session, SessionAction::Start, &ctx_at(14, 2)).unwrap();
        let session = apply_transition(&session, SessionAction::Complete, &ctx_at(15, 0)).unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
    }

    #[test]
    fn table_is_exhaustive() {
        // Inside the start window and after the start, so only the table decides.
        let ctx = ctx_at(14, 5);

        for from in SessionStatus::ALL {
            for action in all_actions() {
                let session = session_in(from);
                let result = apply_transition(&session, action, &ctx);

                if from == action.target() {
                    assert_eq!(result.unwrap(), session, "{from} + {} should be a no-op", action.name());
                } else if is_legal(from, action) {
                    if matches!(action, SessionAction::Confirm { by: Party::Student }) {
                        assert!(result.is_err());
                    } else {
                        assert_eq!(result.unwrap().status, action.target());
                    }
                } else {
                    assert!(
                        matches!(result, Err(AppError::IllegalTransition { .. })),
                        "{from} + {} should be illegal",
                        action.name()
                    );
                }
            }
        }
    }

    #[test]
    fn terminal_states_reject_everything_else() {
        for from in [SessionStatus::Completed, SessionStatus::Cancelled, SessionStatus::NoShow] {
            for action in all_actions() {
                if action.target() == from {
                    continue;
                }
                let result = apply_transition(&session_in(from), action, &ctx_at(14, 5));
                assert!(matches!(result, Err(AppError::IllegalTransition { .. })));
            }
        }
    }
}
