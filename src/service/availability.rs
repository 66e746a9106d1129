use crate::clock::Clock;
use crate::config::SchedulingConfig;
use crate::database::availability::AvailabilityRepository;
use crate::database::session::SessionRepository;
use crate::database::tutor::TutorRepository;
use crate::error::app_error::AppError;
use crate::models::availability::AvailabilityRule;
use crate::models::session::{Session, SessionFilter};
use crate::models::slot::{TimeSlot, TimeWindow, seconds_of, time_from_seconds, union};
use crate::models::tutor::Tutor;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotQuery {
    /// Step between candidate start times.
    pub granularity_minutes: u32,
    /// Length of each slot. Defaults to the granularity.
    pub duration_minutes: Option<u32>,
}

impl SlotQuery {
    pub fn every(granularity_minutes: u32) -> Self {
        Self {
            granularity_minutes,
            duration_minutes: None,
        }
    }

    pub fn lasting(self, duration_minutes: u32) -> Self {
        Self {
            duration_minutes: Some(duration_minutes),
            ..self
        }
    }

    fn duration(&self) -> u32 {
        self.duration_minutes.unwrap_or(self.granularity_minutes)
    }

    fn check(&self) -> Result<(), AppError> {
        if !(1..=MINUTES_PER_DAY).contains(&self.granularity_minutes) {
            return Err(AppError::InvalidInput(format!(
                "Granularity must be between 1 and {MINUTES_PER_DAY} minutes, got {}",
                self.granularity_minutes
            )));
        }
        if !(1..=MINUTES_PER_DAY).contains(&self.duration()) {
            return Err(AppError::InvalidInput(format!(
                "Slot duration must be between 1 and {MINUTES_PER_DAY} minutes, got {}",
                self.duration()
            )));
        }
        Ok(())
    }
}

/// Union of the windows of every rule that applies on `date`.
pub fn open_windows(rules: &[AvailabilityRule], date: NaiveDate) -> Vec<TimeWindow> {
    union(rules.iter().filter(|rule| rule.applies_on(date)).map(AvailabilityRule::window))
}

fn busy_windows(sessions: &[Session], date: NaiveDate) -> Vec<TimeWindow> {
    sessions
        .iter()
        .filter(|session| session.date == date && session.status.occupies_time())
        .map(Session::window)
        .collect()
}

/// Bookable slots for one tutor on `date`, in chronological order.
///
/// `rules` and `sessions` must belong to the same tutor. A slot is kept only when it
/// lies entirely inside the tutor's open time, overlaps no session that still holds
/// the tutor's time, and does not start before `now`.
pub fn open_slots(
    rules: &[AvailabilityRule],
    sessions: &[Session],
    date: NaiveDate,
    query: SlotQuery,
    now: NaiveDateTime,
) -> Result<Vec<TimeSlot>, AppError> {
    query.check()?;

    let step = query.granularity_minutes * 60;
    let length = query.duration() * 60;
    let busy = busy_windows(sessions, date);
    let mut slots = Vec::new();

    for window in open_windows(rules, date) {
        let close = seconds_of(window.end);
        let mut start = seconds_of(window.start);

        while start + length <= close {
            if let (Some(slot_start), Some(slot_end)) = (time_from_seconds(start), time_from_seconds(start + length)) {
                let candidate = TimeWindow::new(slot_start, slot_end);
                if date.and_time(slot_start) >= now && !busy.iter().any(|b| b.overlaps(&candidate)) {
                    slots.push(TimeSlot {
                        date,
                        start: slot_start,
                        end: slot_end,
                    });
                }
            }
            start += step;
        }
    }

    Ok(slots)
}

/// Whether `window` on `date` lies inside the tutor's unioned open time.
pub fn within_availability(rules: &[AvailabilityRule], date: NaiveDate, window: &TimeWindow) -> bool {
    open_windows(rules, date).iter().any(|open| open.contains(window))
}

pub struct AvailabilityService<'a, R> {
    repository: &'a R,
    config: &'a SchedulingConfig,
    clock: &'a dyn Clock,
}

impl<'a, R> AvailabilityService<'a, R>
where
    R: TutorRepository + AvailabilityRepository + SessionRepository,
{
    pub fn new(repository: &'a R, config: &'a SchedulingConfig, clock: &'a dyn Clock) -> Self {
        Self { repository, config, clock }
    }

    pub async fn resolve_slots(&self, tutor_id: &Uuid, date: NaiveDate, query: SlotQuery) -> Result<Vec<TimeSlot>, AppError> {
        self.require_tutor(tutor_id).await?;
        let (rules, sessions) = self.schedule_for(tutor_id, date).await?;
        let now = self.clock.local_now(self.config.tz()?);

        let slots = open_slots(&rules, &sessions, date, query, now)?;
        debug!(
            tutor_id = %tutor_id,
            date = %date,
            granularity = query.granularity_minutes,
            rules = rules.len(),
            sessions = sessions.len(),
            slots = slots.len(),
            "resolved open slots"
        );

        Ok(slots)
    }

    /// Whether a session of `duration_minutes` starting at `start` could be booked now.
    pub async fn is_slot_bookable(&self, tutor_id: &Uuid, date: NaiveDate, start: NaiveTime, duration_minutes: u32) -> Result<bool, AppError> {
        self.require_tutor(tutor_id).await?;
        let window = TimeWindow::starting_at(start, duration_minutes)
            .filter(|w| !w.is_empty())
            .ok_or_else(|| AppError::InvalidInput(format!("A {duration_minutes} minute slot starting at {start} does not fit in one day")))?;

        let (rules, sessions) = self.schedule_for(tutor_id, date).await?;
        let now = self.clock.local_now(self.config.tz()?);

        Ok(date.and_time(start) >= now
            && within_availability(&rules, date, &window)
            && !busy_windows(&sessions, date).iter().any(|b| b.overlaps(&window)))
    }

    pub(crate) async fn require_tutor(&self, tutor_id: &Uuid) -> Result<Tutor, AppError> {
        self.repository
            .get_tutor_by_id(tutor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tutor {tutor_id} not found")))
    }

    pub(crate) async fn schedule_for(&self, tutor_id: &Uuid, date: NaiveDate) -> Result<(Vec<AvailabilityRule>, Vec<Session>), AppError> {
        let rules = self.repository.list_rules_for_tutor(tutor_id).await?;
        let sessions = self.repository.query_sessions(&SessionFilter::for_tutor(*tutor_id).on(date)).await?;
        Ok((rules, sessions))
    }
}
