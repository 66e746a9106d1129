use crate::error::app_error::AppError;
use crate::models::availability::AvailabilityRule;
use crate::models::fixture::Fixture;
use crate::models::session::Session;
use crate::models::tutor::{MAX_HOURLY_RATE, Tutor};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock};
use tracing::info;
use uuid::Uuid;

/// In-process store backing all repositories.
///
/// Reads and writes go through a single `RwLock`. Session creation is additionally
/// serialized per `(tutor_id, date)` so the overlap check and the insert form one
/// atomic unit even though they take the data lock separately.
#[derive(Default)]
pub struct MemoryRepository {
    pub(crate) state: RwLock<StoreState>,
    pub(crate) booking_locks: BookingLocks,
}

#[derive(Default)]
pub(crate) struct StoreState {
    pub tutors: HashMap<Uuid, Tutor>,
    pub rules: HashMap<Uuid, AvailabilityRule>,
    pub sessions: HashMap<Uuid, Session>,
    /// Bumped on every session write.
    pub version: u64,
}

impl StoreState {
    pub fn find_clash(&self, candidate: &Session) -> Option<&Session> {
        self.sessions
            .values()
            .find(|existing| existing.id != candidate.id && existing.clashes_with(candidate))
    }
}

type BookingKey = (Uuid, NaiveDate);

/// Per `(tutor_id, date)` booking mutexes. An entry lives only while some task
/// holds or waits for it.
#[derive(Default)]
pub(crate) struct BookingLocks {
    locks: Mutex<HashMap<BookingKey, Arc<AsyncMutex<()>>>>,
}

pub(crate) struct BookingGuard<'a> {
    owner: &'a BookingLocks,
    key: BookingKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl BookingLocks {
    pub async fn acquire(&self, tutor_id: Uuid, date: NaiveDate) -> BookingGuard<'_> {
        let key = (tutor_id, date);
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key).or_default())
        };
        BookingGuard {
            owner: self,
            key,
            guard: Some(lock.lock_owned().await),
        }
    }

    fn release(&self, key: &BookingKey) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // The map's own reference is the last one: nobody holds or waits for this key.
        if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for BookingGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.owner.release(&self.key);
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from seed data, holding it to the same invariants as the
    /// request paths: valid rates and rule dates, known tutors, consistent session
    /// times and no clashes.
    pub fn from_fixture(fixture: Fixture) -> Result<Self, AppError> {
        let mut state = StoreState::default();

        for tutor in fixture.tutors {
            if !(0..=MAX_HOURLY_RATE).contains(&tutor.hourly_rate) {
                return Err(AppError::InvalidInput(format!(
                    "Tutor {} has hourly rate {} outside 0..={MAX_HOURLY_RATE}",
                    tutor.id, tutor.hourly_rate
                )));
            }
            state.tutors.insert(tutor.id, tutor);
        }

        for rule in fixture.rules {
            if !state.tutors.contains_key(&rule.tutor_id) {
                return Err(AppError::NotFound(format!("Tutor {} not found for rule {}", rule.tutor_id, rule.id)));
            }
            if rule.start_time >= rule.end_time || rule.day_of_week > 6 {
                return Err(AppError::InvalidInput(format!("Availability rule {} is malformed", rule.id)));
            }
            if rule.effective_until.is_some_and(|until| until < rule.effective_from) {
                return Err(AppError::InvalidInput(format!("Availability rule {} ends before it starts", rule.id)));
            }
            state.rules.insert(rule.id, rule);
        }

        for session in fixture.sessions {
            if !state.tutors.contains_key(&session.tutor_id) {
                return Err(AppError::NotFound(format!("Tutor {} not found for session {}", session.tutor_id, session.id)));
            }
            if !session.has_consistent_times() {
                return Err(AppError::InvalidInput(format!("Session {} has inconsistent start, end and duration", session.id)));
            }
            if let Some(existing) = state.find_clash(&session) {
                return Err(AppError::Conflict(format!("Session {} overlaps session {}", session.id, existing.id)));
            }
            state.sessions.insert(session.id, session);
        }

        info!(
            tutors = state.tutors.len(),
            rules = state.rules.len(),
            sessions = state.sessions.len(),
            "seeded in-memory store"
        );

        Ok(Self {
            state: RwLock::new(state),
            booking_locks: BookingLocks::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_rule, sample_session, sample_tutor};

    #[test]
    fn fixture_with_clashing_sessions_is_rejected() {
        let tutor = sample_tutor();
        let first = sample_session(&tutor, 14, 0, 60);
        let second = sample_session(&tutor, 14, 30, 60);

        let fixture = Fixture {
            tutors: vec![tutor],
            rules: vec![],
            sessions: vec![first, second],
        };

        assert!(matches!(MemoryRepository::from_fixture(fixture), Err(AppError::Conflict(_))));
    }

    #[test]
    fn fixture_rule_for_unknown_tutor_is_rejected() {
        let tutor = sample_tutor();
        let fixture = Fixture {
            tutors: vec![],
            rules: vec![sample_rule(&tutor, 1, 13, 17)],
            sessions: vec![],
        };

        assert!(matches!(MemoryRepository::from_fixture(fixture), Err(AppError::NotFound(_))));
    }

    #[test]
    fn fixture_session_for_unknown_tutor_is_rejected() {
        let tutor = sample_tutor();
        let fixture = Fixture {
            tutors: vec![],
            rules: vec![],
            sessions: vec![sample_session(&tutor, 9, 0, 60)],
        };

        assert!(matches!(MemoryRepository::from_fixture(fixture), Err(AppError::NotFound(_))));
    }

    #[test]
    fn fixture_tutor_with_out_of_range_rate_is_rejected() {
        for hourly_rate in [-1, MAX_HOURLY_RATE + 1] {
            let fixture = Fixture {
                tutors: vec![Tutor {
                    hourly_rate,
                    ..sample_tutor()
                }],
                rules: vec![],
                sessions: vec![],
            };

            assert!(matches!(MemoryRepository::from_fixture(fixture), Err(AppError::InvalidInput(_))));
        }
    }

    #[test]
    fn fixture_rule_ending_before_it_starts_is_rejected() {
        let tutor = sample_tutor();
        let rule = AvailabilityRule {
            effective_until: NaiveDate::from_ymd_opt(2025, 12, 31),
            ..sample_rule(&tutor, 1, 13, 17)
        };
        let fixture = Fixture {
            tutors: vec![tutor],
            rules: vec![rule],
            sessions: vec![],
        };

        assert!(matches!(MemoryRepository::from_fixture(fixture), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn fixture_session_with_inconsistent_duration_is_rejected() {
        let tutor = sample_tutor();
        let mut session = sample_session(&tutor, 9, 0, 60);
        session.duration_minutes = 30;

        let fixture = Fixture {
            tutors: vec![tutor],
            rules: vec![],
            sessions: vec![session],
        };

        assert!(matches!(MemoryRepository::from_fixture(fixture), Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn booking_locks_are_keyed_by_tutor_and_date() {
        let locks = BookingLocks::default();
        let tutor = Uuid::new_v4();
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let _held = locks.acquire(tutor, day).await;
        // A different key must not wait on the held lock.
        let _other_day = locks.acquire(tutor, day.succ_opt().unwrap()).await;
        let _other_tutor = locks.acquire(Uuid::new_v4(), day).await;

        let lock = {
            let map = locks.locks.lock().unwrap();
            Arc::clone(map.get(&(tutor, day)).unwrap())
        };
        assert!(lock.try_lock().is_err());
    }

    #[tokio::test]
    async fn booking_locks_are_released_when_idle() {
        let locks = BookingLocks::default();
        let tutor = Uuid::new_v4();
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let first = locks.acquire(tutor, day).await;
        let second = locks.acquire(tutor, day.succ_opt().unwrap()).await;
        assert_eq!(locks.len(), 2);

        drop(first);
        assert_eq!(locks.len(), 1);
        drop(second);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn lock_entry_survives_while_another_task_waits() {
        let repository = Arc::new(MemoryRepository::new());
        let tutor = Uuid::new_v4();
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let held = repository.booking_locks.acquire(tutor, day).await;
        let waiter = {
            let repository = Arc::clone(&repository);
            tokio::spawn(async move {
                let _guard = repository.booking_locks.acquire(tutor, day).await;
            })
        };
        while repository.booking_locks.locks.lock().unwrap().get(&(tutor, day)).map(Arc::strong_count) != Some(3) {
            tokio::task::yield_now().await;
        }

        drop(held);
        assert_eq!(repository.booking_locks.len(), 1);
        waiter.await.unwrap();
        assert_eq!(repository.booking_locks.len(), 0);
    }
}
