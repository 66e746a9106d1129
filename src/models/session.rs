use crate::models::slot::TimeWindow;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    #[default]
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 6] = [
        SessionStatus::Scheduled,
        SessionStatus::Confirmed,
        SessionStatus::InProgress,
        SessionStatus::Completed,
        SessionStatus::Cancelled,
        SessionStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Confirmed => "confirmed",
            SessionStatus::InProgress => "in-progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::NoShow => "no-show",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled | SessionStatus::NoShow)
    }

    /// Every status except `cancelled` keeps the tutor's time occupied.
    pub fn occupies_time(&self) -> bool {
        *self != SessionStatus::Cancelled
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    #[default]
    Online,
    InPerson,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    #[default]
    Student,
    Tutor,
}

impl Party {
    pub fn counterparty(self) -> Party {
        match self {
            Party::Student => Party::Tutor,
            Party::Tutor => Party::Student,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Student => f.write_str("student"),
            Party::Tutor => f.write_str("tutor"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    pub by: Party,
    pub at: DateTime<Utc>,
    /// Cancelled at or after the scheduled start.
    pub late: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub student_id: Uuid,
    pub tutor_id: Uuid,
    pub subject_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: u32,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub mode: SessionMode,
    #[serde(default)]
    pub location: Option<String>,
    /// Minor currency units.
    pub price: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub initiated_by: Party,
    #[serde(default)]
    pub cancellation: Option<Cancellation>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    pub fn involves(&self, participant_id: &Uuid) -> bool {
        self.student_id == *participant_id || self.tutor_id == *participant_id
    }

    /// Both sessions hold the same tutor's time on the same day and overlap.
    pub fn clashes_with(&self, other: &Session) -> bool {
        self.tutor_id == other.tutor_id
            && self.date == other.date
            && self.status.occupies_time()
            && other.status.occupies_time()
            && self.window().overlaps(&other.window())
    }

    /// `start_time + duration_minutes == end_time` on the same day.
    pub fn has_consistent_times(&self) -> bool {
        TimeWindow::starting_at(self.start_time, self.duration_minutes).is_some_and(|w| w.end == self.end_time)
    }
}

/// A state change requested on a session.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionAction {
    Confirm { by: Party },
    Cancel { by: Party },
    Start,
    Complete,
    NoShow,
}

impl SessionAction {
    pub fn name(&self) -> &'static str {
        match self {
            SessionAction::Confirm { .. } => "confirm",
            SessionAction::Cancel { .. } => "cancel",
            SessionAction::Start => "start",
            SessionAction::Complete => "complete",
            SessionAction::NoShow => "mark as no-show",
        }
    }

    pub fn target(&self) -> SessionStatus {
        match self {
            SessionAction::Confirm { .. } => SessionStatus::Confirmed,
            SessionAction::Cancel { .. } => SessionStatus::Cancelled,
            SessionAction::Start => SessionStatus::InProgress,
            SessionAction::Complete => SessionStatus::Completed,
            SessionAction::NoShow => SessionStatus::NoShow,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
#[validate(schema(function = "validate_location"))]
pub struct BookingRequest {
    pub student_id: Uuid,
    pub tutor_id: Uuid,
    pub subject_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: u32,
    #[serde(default)]
    pub mode: SessionMode,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: String,
    pub initiated_by: Party,
    /// Overrides the tutor's pro-rated hourly rate.
    #[validate(range(min = 0))]
    pub price: Option<i64>,
}

fn validate_location(request: &BookingRequest) -> Result<(), ValidationError> {
    let has_location = request.location.as_deref().is_some_and(|l| !l.trim().is_empty());
    if request.mode == SessionMode::InPerson && !has_location {
        return Err(ValidationError::new("in_person_session_requires_location"));
    }
    Ok(())
}

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct NotesRequest {
    #[validate(length(max = 2000))]
    pub notes: String,
}

/// Whose sessions a query is about.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "role", content = "id", rename_all = "lowercase")]
pub enum Participant {
    Student(Uuid),
    Tutor(Uuid),
    /// Either side of the session.
    Any(Uuid),
}

impl Participant {
    pub fn matches(&self, session: &Session) -> bool {
        match self {
            Participant::Student(id) => session.student_id == *id,
            Participant::Tutor(id) => session.tutor_id == *id,
            Participant::Any(id) => session.involves(id),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SessionFilter {
    pub participant: Option<Participant>,
    /// Empty matches every status.
    #[serde(default)]
    pub statuses: Vec<SessionStatus>,
    /// Inclusive.
    pub date_from: Option<NaiveDate>,
    /// Inclusive.
    pub date_to: Option<NaiveDate>,
    pub subject_id: Option<Uuid>,
}

impl SessionFilter {
    pub fn for_tutor(tutor_id: Uuid) -> Self {
        Self {
            participant: Some(Participant::Tutor(tutor_id)),
            ..Self::default()
        }
    }

    pub fn for_student(student_id: Uuid) -> Self {
        Self {
            participant: Some(Participant::Student(student_id)),
            ..Self::default()
        }
    }

    pub fn involving(participant_id: Uuid) -> Self {
        Self {
            participant: Some(Participant::Any(participant_id)),
            ..Self::default()
        }
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = SessionStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn on(self, date: NaiveDate) -> Self {
        self.between(date, date)
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    pub fn matches(&self, session: &Session) -> bool {
        self.participant.is_none_or(|p| p.matches(session))
            && (self.statuses.is_empty() || self.statuses.contains(&session.status))
            && self.date_from.is_none_or(|from| session.date >= from)
            && self.date_to.is_none_or(|to| session.date <= to)
            && self.subject_id.is_none_or(|subject| session.subject_id == subject)
    }
}
