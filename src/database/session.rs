use crate::database::memory_repository::MemoryRepository;
use crate::error::app_error::AppError;
use crate::models::session::{Session, SessionFilter};
use tracing::{debug, warn};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session. Fails with `Conflict` when it overlaps a non-cancelled
    /// session of the same tutor.
    async fn create_session(&self, session: Session) -> Result<Session, AppError>;
    async fn get_session_by_id(&self, id: &Uuid) -> Result<Option<Session>, AppError>;
    /// Matching sessions ordered by date, then start time.
    async fn query_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>, AppError>;
    /// Atomic read-modify-write. When `update` fails the stored session is untouched.
    async fn update_session<F>(&self, id: &Uuid, update: F) -> Result<Session, AppError>
    where
        F: FnOnce(&Session) -> Result<Session, AppError> + Send;
    /// Monotonic counter of session writes, usable as a cache key.
    async fn version(&self) -> u64;
}

#[async_trait::async_trait]
impl SessionRepository for MemoryRepository {
    async fn create_session(&self, session: Session) -> Result<Session, AppError> {
        let _booking = self.booking_locks.acquire(session.tutor_id, session.date).await;

        if let Some(existing) = self.state.read().await.find_clash(&session) {
            warn!(
                tutor_id = %session.tutor_id,
                date = %session.date,
                start = %session.start_time,
                existing_id = %existing.id,
                "rejected overlapping session"
            );
            return Err(AppError::Conflict(format!(
                "Tutor {} already has a session from {} to {} on {}",
                session.tutor_id, existing.start_time, existing.end_time, existing.date
            )));
        }

        let mut state = self.state.write().await;
        if state.sessions.contains_key(&session.id) {
            return Err(AppError::Conflict(format!("Session {} already exists", session.id)));
        }
        state.sessions.insert(session.id, session.clone());
        state.version += 1;
        debug!(session_id = %session.id, version = state.version, "session stored");

        Ok(session)
    }

    async fn get_session_by_id(&self, id: &Uuid) -> Result<Option<Session>, AppError> {
        Ok(self.state.read().await.sessions.get(id).cloned())
    }

    async fn query_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>, AppError> {
        let mut sessions: Vec<Session> = self
            .state
            .read()
            .await
            .sessions
            .values()
            .filter(|session| filter.matches(session))
            .cloned()
            .collect();
        sessions.sort_by_key(|session| (session.date, session.start_time, session.id));
        Ok(sessions)
    }

    async fn update_session<F>(&self, id: &Uuid, update: F) -> Result<Session, AppError>
    where
        F: FnOnce(&Session) -> Result<Session, AppError> + Send,
    {
        let mut state = self.state.write().await;
        let current = state
            .sessions
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;

        let updated = update(current)?;
        if updated == *current {
            return Ok(updated);
        }
        if updated.id != *id {
            return Err(AppError::InvalidInput("Session id cannot change".to_string()));
        }
        if let Some(existing) = state.find_clash(&updated) {
            return Err(AppError::Conflict(format!("Session {} would overlap session {}", id, existing.id)));
        }

        state.sessions.insert(*id, updated.clone());
        state.version += 1;
        Ok(updated)
    }

    async fn version(&self) -> u64 {
        self.state.read().await.version
    }
}
