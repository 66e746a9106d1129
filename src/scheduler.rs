use crate::clock::{Clock, SystemClock};
use crate::config::SchedulingConfig;
use crate::database::availability::AvailabilityRepository;
use crate::database::memory_repository::MemoryRepository;
use crate::database::session::SessionRepository;
use crate::database::tutor::TutorRepository;
use crate::error::app_error::AppError;
use crate::models::availability::{AvailabilityRule, AvailabilityRuleRequest};
use crate::models::dashboard::SessionSummary;
use crate::models::session::{BookingRequest, NotesRequest, Participant, Session, SessionAction, SessionFilter};
use crate::models::session_set::SessionSet;
use crate::models::slot::TimeSlot;
use crate::models::tutor::{Tutor, TutorRequest};
use crate::service::availability::{AvailabilityService, SlotQuery};
use crate::service::booking::BookingService;
use crate::service::dashboard::DashboardService;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Entry point for presentation code: slot resolution, booking, lifecycle
/// transitions and session queries over one store.
pub struct Scheduler<R = MemoryRepository> {
    repository: Arc<R>,
    config: SchedulingConfig,
    clock: Arc<dyn Clock>,
}

impl<R> Scheduler<R>
where
    R: TutorRepository + AvailabilityRepository + SessionRepository,
{
    pub fn new(repository: Arc<R>, config: SchedulingConfig) -> Result<Self, AppError> {
        config.tz()?;
        Ok(Self {
            repository,
            config,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(self, clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
            ..self
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// Today in the configured timezone.
    pub fn today(&self) -> Result<NaiveDate, AppError> {
        Ok(self.clock.local_now(self.config.tz()?).date())
    }

    fn availability(&self) -> AvailabilityService<'_, R> {
        AvailabilityService::new(self.repository.as_ref(), &self.config, self.clock.as_ref())
    }

    fn booking(&self) -> BookingService<'_, R> {
        BookingService::new(self.repository.as_ref(), &self.config, self.clock.as_ref())
    }

    pub async fn resolve_slots(&self, tutor_id: &Uuid, date: NaiveDate, granularity_minutes: u32) -> Result<Vec<TimeSlot>, AppError> {
        self.availability().resolve_slots(tutor_id, date, SlotQuery::every(granularity_minutes)).await
    }

    pub async fn resolve_slots_for(&self, tutor_id: &Uuid, date: NaiveDate, query: SlotQuery) -> Result<Vec<TimeSlot>, AppError> {
        self.availability().resolve_slots(tutor_id, date, query).await
    }

    pub async fn is_slot_bookable(&self, tutor_id: &Uuid, date: NaiveDate, start: NaiveTime, duration_minutes: u32) -> Result<bool, AppError> {
        self.availability().is_slot_bookable(tutor_id, date, start, duration_minutes).await
    }

    pub async fn create_session(&self, request: &BookingRequest) -> Result<Session, AppError> {
        self.booking().create_session(request).await
    }

    pub async fn transition(&self, session_id: &Uuid, action: SessionAction) -> Result<Session, AppError> {
        self.booking().transition(session_id, action).await
    }

    pub async fn get_session(&self, session_id: &Uuid) -> Result<Session, AppError> {
        self.booking().get_session(session_id).await
    }

    pub async fn query_sessions(&self, filter: &SessionFilter) -> Result<SessionSet, AppError> {
        Ok(SessionSet::new(self.repository.query_sessions(filter).await?))
    }

    pub async fn update_notes(&self, session_id: &Uuid, request: &NotesRequest) -> Result<Session, AppError> {
        self.booking().update_notes(session_id, request).await
    }

    pub async fn summary(&self, participant: Participant) -> Result<SessionSummary, AppError> {
        let today = self.today()?;
        DashboardService::new(self.repository.as_ref()).summary(participant, today).await
    }

    pub async fn add_tutor(&self, request: &TutorRequest) -> Result<Tutor, AppError> {
        request.validate()?;
        self.repository.create_tutor(request).await
    }

    pub async fn add_availability(&self, request: &AvailabilityRuleRequest) -> Result<AvailabilityRule, AppError> {
        request.validate()?;
        self.repository.create_rule(request).await
    }

    pub async fn close_date(&self, rule_id: &Uuid, date: NaiveDate) -> Result<AvailabilityRule, AppError> {
        self.repository.add_exception(rule_id, date).await
    }

    pub async fn remove_availability(&self, rule_id: &Uuid) -> Result<(), AppError> {
        self.repository.delete_rule(rule_id).await
    }
}
