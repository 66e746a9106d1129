use crate::error::app_error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Tutor {
    pub id: Uuid,
    pub name: String,
    /// Price of one hour, in minor currency units.
    pub hourly_rate: i64,
    /// Subjects the tutor teaches. Empty means any subject may be booked.
    #[serde(default)]
    pub subject_ids: Vec<Uuid>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Tutor {
    pub fn teaches(&self, subject_id: &Uuid) -> bool {
        self.subject_ids.is_empty() || self.subject_ids.contains(subject_id)
    }

    /// Pro-rated price for a session of `duration_minutes`, rounded down.
    pub fn price_for(&self, duration_minutes: u32) -> Result<i64, AppError> {
        self.hourly_rate
            .checked_mul(i64::from(duration_minutes))
            .map(|total| total / 60)
            .ok_or_else(|| AppError::InvalidInput(format!("Price of a {duration_minutes} minute session with tutor {} is out of range", self.id)))
    }
}

/// Upper bound on `hourly_rate`, in minor currency units.
pub const MAX_HOURLY_RATE: i64 = 100_000_000;

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct TutorRequest {
    #[validate(length(min = 3, max = 100))]
    pub name: String,
    #[validate(range(min = 0, max = MAX_HOURLY_RATE))]
    pub hourly_rate: i64,
    #[serde(default)]
    pub subject_ids: Vec<Uuid>,
}
