use crate::models::session::{Session, SessionStatus};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub total: usize,
    pub status_counts: BTreeMap<SessionStatus, usize>,
    /// Next non-terminal sessions from today on, earliest first.
    pub upcoming: Vec<Session>,
    /// Share of attended sessions (completed vs. no-show), in percent.
    pub completion_rate: Option<f64>,
    /// Sum of completed session prices, in minor currency units.
    pub total_earned: i64,
    pub hours_completed: f64,
}
