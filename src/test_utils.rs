use crate::clock::FixedClock;
use crate::config::SchedulingConfig;
use crate::database::memory_repository::MemoryRepository;
use crate::models::availability::AvailabilityRule;
use crate::models::fixture::Fixture;
use crate::models::session::{BookingRequest, Party, Session, SessionMode, SessionStatus};
use crate::models::slot::TimeWindow;
use crate::models::tutor::Tutor;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

/// Monday used as the default booking day in tests.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 26).unwrap()
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_time(time(hour, minute))
}

/// A week before [`monday`], 09:00 UTC.
pub fn fixed_clock() -> FixedClock {
    clock_at(at(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), 9, 0))
}

pub fn clock_at(local: NaiveDateTime) -> FixedClock {
    FixedClock(Utc.from_utc_datetime(&local))
}

pub fn scheduling_config() -> SchedulingConfig {
    SchedulingConfig::default()
}

pub fn sample_tutor() -> Tutor {
    Tutor {
        id: Uuid::new_v4(),
        name: "Marie Curie".to_string(),
        hourly_rate: 6000,
        subject_ids: vec![],
        created_at: Utc::now(),
    }
}

pub fn sample_rule(tutor: &Tutor, day_of_week: u8, start_hour: u32, end_hour: u32) -> AvailabilityRule {
    AvailabilityRule {
        id: Uuid::new_v4(),
        tutor_id: tutor.id,
        day_of_week,
        start_time: time(start_hour, 0),
        end_time: time(end_hour, 0),
        effective_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        effective_until: None,
        exceptions: Default::default(),
        created_at: Utc::now(),
    }
}

/// Session for `tutor` on [`monday`].
pub fn sample_session(tutor: &Tutor, hour: u32, minute: u32, duration_minutes: u32) -> Session {
    let window = TimeWindow::starting_at(time(hour, minute), duration_minutes).unwrap();
    Session {
        id: Uuid::new_v4(),
        student_id: Uuid::new_v4(),
        tutor_id: tutor.id,
        subject_id: Uuid::new_v4(),
        date: monday(),
        start_time: window.start,
        end_time: window.end,
        duration_minutes,
        status: SessionStatus::Scheduled,
        mode: SessionMode::Online,
        price: tutor.price_for(duration_minutes).unwrap(),
        initiated_by: Party::Student,
        ..Session::default()
    }
}

pub fn booking_request(tutor: &Tutor, hour: u32, minute: u32, duration_minutes: u32) -> BookingRequest {
    BookingRequest {
        student_id: Uuid::new_v4(),
        tutor_id: tutor.id,
        subject_id: Uuid::new_v4(),
        date: monday(),
        start_time: time(hour, minute),
        duration_minutes,
        mode: SessionMode::Online,
        location: None,
        notes: String::new(),
        initiated_by: Party::Student,
        price: None,
    }
}

/// Store holding one tutor available Mondays 13:00-17:00.
pub fn seeded_repository() -> (MemoryRepository, Tutor) {
    let tutor = sample_tutor();
    let fixture = Fixture {
        tutors: vec![tutor.clone()],
        rules: vec![sample_rule(&tutor, 1, 13, 17)],
        sessions: vec![],
    };
    (MemoryRepository::from_fixture(fixture).unwrap(), tutor)
}
