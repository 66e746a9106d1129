use crate::database::memory_repository::MemoryRepository;
use crate::error::app_error::AppError;
use crate::models::tutor::{Tutor, TutorRequest};
use chrono::Utc;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait TutorRepository: Send + Sync {
    async fn create_tutor(&self, request: &TutorRequest) -> Result<Tutor, AppError>;
    async fn get_tutor_by_id(&self, id: &Uuid) -> Result<Option<Tutor>, AppError>;
    async fn list_tutors(&self) -> Result<Vec<Tutor>, AppError>;
}

#[async_trait::async_trait]
impl TutorRepository for MemoryRepository {
    async fn create_tutor(&self, request: &TutorRequest) -> Result<Tutor, AppError> {
        let tutor = Tutor {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            hourly_rate: request.hourly_rate,
            subject_ids: request.subject_ids.clone(),
            created_at: Utc::now(),
        };

        self.state.write().await.tutors.insert(tutor.id, tutor.clone());
        Ok(tutor)
    }

    async fn get_tutor_by_id(&self, id: &Uuid) -> Result<Option<Tutor>, AppError> {
        Ok(self.state.read().await.tutors.get(id).cloned())
    }

    async fn list_tutors(&self) -> Result<Vec<Tutor>, AppError> {
        let mut tutors: Vec<Tutor> = self.state.read().await.tutors.values().cloned().collect();
        tutors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tutors)
    }
}
