use crate::models::slot::TimeWindow;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A tutor's recurring weekly open window.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AvailabilityRule {
    pub id: Uuid,
    pub tutor_id: Uuid,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub effective_from: NaiveDate,
    /// Inclusive. `None` keeps the rule open-ended.
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
    #[serde(default)]
    pub exceptions: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl AvailabilityRule {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    pub fn applies_on(&self, date: NaiveDate) -> bool {
        day_of_week(date) == self.day_of_week
            && date >= self.effective_from
            && self.effective_until.is_none_or(|until| date <= until)
            && !self.exceptions.contains(&date)
    }
}

pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
#[validate(schema(function = "validate_rule"))]
pub struct AvailabilityRuleRequest {
    pub tutor_id: Uuid,
    #[validate(range(max = 6))]
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
    #[serde(default)]
    pub exceptions: BTreeSet<NaiveDate>,
}

fn validate_rule(request: &AvailabilityRuleRequest) -> Result<(), ValidationError> {
    if request.start_time >= request.end_time {
        return Err(ValidationError::new("start_time_must_be_before_end_time"));
    }
    if request.effective_until.is_some_and(|until| until < request.effective_from) {
        return Err(ValidationError::new("effective_until_must_not_precede_effective_from"));
    }
    Ok(())
}

impl From<&AvailabilityRuleRequest> for AvailabilityRule {
    fn from(request: &AvailabilityRuleRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            tutor_id: request.tutor_id,
            day_of_week: request.day_of_week,
            start_time: request.start_time,
            end_time: request.end_time,
            effective_from: request.effective_from,
            effective_until: request.effective_until,
            exceptions: request.exceptions.clone(),
            created_at: Utc::now(),
        }
    }
}
