use crate::clock::Clock;
use crate::config::SchedulingConfig;
use crate::database::availability::AvailabilityRepository;
use crate::database::session::SessionRepository;
use crate::database::tutor::TutorRepository;
use crate::error::app_error::AppError;
use crate::models::session::{BookingRequest, NotesRequest, Session, SessionAction, SessionStatus};
use crate::models::slot::TimeWindow;
use crate::service::availability::{AvailabilityService, within_availability};
use crate::service::lifecycle::{TransitionContext, apply_transition};
use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

pub struct BookingService<'a, R> {
    repository: &'a R,
    config: &'a SchedulingConfig,
    clock: &'a dyn Clock,
}

impl<'a, R> BookingService<'a, R>
where
    R: TutorRepository + AvailabilityRepository + SessionRepository,
{
    pub fn new(repository: &'a R, config: &'a SchedulingConfig, clock: &'a dyn Clock) -> Self {
        Self { repository, config, clock }
    }

    /// Book a new session in `scheduled` status.
    pub async fn create_session(&self, request: &BookingRequest) -> Result<Session, AppError> {
        request.validate()?;

        let (min, max) = (self.config.min_duration_minutes, self.config.max_duration_minutes);
        if !(min..=max).contains(&request.duration_minutes) {
            return Err(AppError::InvalidInput(format!(
                "Sessions last between {min} and {max} minutes, got {}",
                request.duration_minutes
            )));
        }

        let availability = AvailabilityService::new(self.repository, self.config, self.clock);
        let tutor = availability.require_tutor(&request.tutor_id).await?;
        if !tutor.teaches(&request.subject_id) {
            return Err(AppError::InvalidInput(format!("Tutor {} does not teach subject {}", tutor.id, request.subject_id)));
        }

        let window = TimeWindow::starting_at(request.start_time, request.duration_minutes)
            .ok_or_else(|| AppError::InvalidInput("Sessions cannot run past midnight".to_string()))?;

        let price = match request.price {
            Some(price) => price,
            None => tutor.price_for(request.duration_minutes)?,
        };

        let now = self.clock.now();
        if request.date.and_time(request.start_time) < self.clock.local_now(self.config.tz()?) {
            return Err(AppError::InvalidInput("Sessions cannot be booked in the past".to_string()));
        }

        if self.config.enforce_availability {
            let rules = self.repository.list_rules_for_tutor(&tutor.id).await?;
            if !within_availability(&rules, request.date, &window) {
                warn!(
                    tutor_id = %tutor.id,
                    date = %request.date,
                    start = %request.start_time,
                    "booking outside tutor availability"
                );
                return Err(AppError::Conflict(format!(
                    "Tutor {} is not available on {} from {} to {}",
                    tutor.id, request.date, window.start, window.end
                )));
            }
        }

        let session = Session {
            id: Uuid::new_v4(),
            student_id: request.student_id,
            tutor_id: tutor.id,
            subject_id: request.subject_id,
            date: request.date,
            start_time: window.start,
            end_time: window.end,
            duration_minutes: request.duration_minutes,
            status: SessionStatus::Scheduled,
            mode: request.mode,
            location: request.location.clone(),
            price,
            notes: request.notes.clone(),
            initiated_by: request.initiated_by,
            cancellation: None,
            created_at: now,
            updated_at: now,
        };

        let session = self.repository.create_session(session).await?;
        info!(
            session_id = %session.id,
            tutor_id = %session.tutor_id,
            student_id = %session.student_id,
            date = %session.date,
            start = %session.start_time,
            duration = session.duration_minutes,
            "session booked"
        );

        Ok(session)
    }

    pub async fn get_session(&self, session_id: &Uuid) -> Result<Session, AppError> {
        self.repository
            .get_session_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))
    }

    pub async fn transition(&self, session_id: &Uuid, action: SessionAction) -> Result<Session, AppError> {
        let ctx = TransitionContext {
            local_now: self.clock.local_now(self.config.tz()?),
            now: self.clock.now(),
            start_tolerance: Duration::minutes(i64::from(self.config.start_tolerance_minutes)),
        };

        let session = self
            .repository
            .update_session(session_id, |current| apply_transition(current, action, &ctx))
            .await
            .inspect_err(|err| warn!(session_id = %session_id, action = action.name(), error = %err, "transition rejected"))?;

        info!(session_id = %session.id, action = action.name(), status = %session.status, "session transitioned");
        Ok(session)
    }

    pub async fn update_notes(&self, session_id: &Uuid, request: &NotesRequest) -> Result<Session, AppError> {
        request.validate()?;
        let now = self.clock.now();

        self.repository
            .update_session(session_id, |current| {
                if current.notes == request.notes {
                    return Ok(current.clone());
                }
                Ok(Session {
                    notes: request.notes.clone(),
                    updated_at: now,
                    ..current.clone()
                })
            })
            .await
    }
}
