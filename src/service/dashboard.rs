use crate::database::session::SessionRepository;
use crate::error::app_error::AppError;
use crate::models::dashboard::SessionSummary;
use crate::models::session::{Participant, Session, SessionFilter, SessionStatus};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

const UPCOMING_LIMIT: usize = 5;

pub struct DashboardService<'a, R> {
    repository: &'a R,
}

impl<'a, R: SessionRepository> DashboardService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    pub async fn summary(&self, participant: Participant, today: NaiveDate) -> Result<SessionSummary, AppError> {
        let filter = SessionFilter {
            participant: Some(participant),
            ..SessionFilter::default()
        };
        let sessions = self.repository.query_sessions(&filter).await?;
        debug!(?participant, sessions = sessions.len(), "building session summary");

        Ok(summarize(&sessions, today))
    }
}

/// Aggregate statistics over `sessions`, which are expected in chronological order.
pub fn summarize(sessions: &[Session], today: NaiveDate) -> SessionSummary {
    let mut status_counts: BTreeMap<SessionStatus, usize> = SessionStatus::ALL.into_iter().map(|status| (status, 0)).collect();
    for session in sessions {
        *status_counts.entry(session.status).or_default() += 1;
    }

    let completed: Vec<&Session> = sessions.iter().filter(|s| s.status == SessionStatus::Completed).collect();
    let no_shows = status_counts[&SessionStatus::NoShow];
    let attended_or_missed = completed.len() + no_shows;

    let completion_rate = if attended_or_missed > 0 {
        Some(completed.len() as f64 / attended_or_missed as f64 * 100.0)
    } else {
        None
    };

    let upcoming = sessions
        .iter()
        .filter(|s| !s.status.is_terminal() && s.date >= today)
        .take(UPCOMING_LIMIT)
        .cloned()
        .collect();

    SessionSummary {
        total: sessions.len(),
        status_counts,
        upcoming,
        completion_rate,
        total_earned: completed.iter().map(|s| s.price).sum(),
        hours_completed: completed.iter().map(|s| f64::from(s.duration_minutes)).sum::<f64>() / 60.0,
    }
}
