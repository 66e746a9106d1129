use crate::database::memory_repository::MemoryRepository;
use crate::error::app_error::AppError;
use crate::models::availability::{AvailabilityRule, AvailabilityRuleRequest};
use chrono::NaiveDate;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn create_rule(&self, request: &AvailabilityRuleRequest) -> Result<AvailabilityRule, AppError>;
    async fn list_rules_for_tutor(&self, tutor_id: &Uuid) -> Result<Vec<AvailabilityRule>, AppError>;
    async fn add_exception(&self, rule_id: &Uuid, date: NaiveDate) -> Result<AvailabilityRule, AppError>;
    async fn delete_rule(&self, rule_id: &Uuid) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl AvailabilityRepository for MemoryRepository {
    async fn create_rule(&self, request: &AvailabilityRuleRequest) -> Result<AvailabilityRule, AppError> {
        let mut state = self.state.write().await;
        if !state.tutors.contains_key(&request.tutor_id) {
            return Err(AppError::NotFound(format!("Tutor {} not found", request.tutor_id)));
        }

        let rule = AvailabilityRule::from(request);
        state.rules.insert(rule.id, rule.clone());
        Ok(rule)
    }

    async fn list_rules_for_tutor(&self, tutor_id: &Uuid) -> Result<Vec<AvailabilityRule>, AppError> {
        let mut rules: Vec<AvailabilityRule> = self
            .state
            .read()
            .await
            .rules
            .values()
            .filter(|rule| rule.tutor_id == *tutor_id)
            .cloned()
            .collect();
        rules.sort_by_key(|rule| (rule.day_of_week, rule.start_time, rule.end_time));
        Ok(rules)
    }

    async fn add_exception(&self, rule_id: &Uuid, date: NaiveDate) -> Result<AvailabilityRule, AppError> {
        let mut state = self.state.write().await;
        let rule = state
            .rules
            .get_mut(rule_id)
            .ok_or_else(|| AppError::NotFound(format!("Availability rule {rule_id} not found")))?;

        rule.exceptions.insert(date);
        Ok(rule.clone())
    }

    async fn delete_rule(&self, rule_id: &Uuid) -> Result<(), AppError> {
        match self.state.write().await.rules.remove(rule_id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("Availability rule {rule_id} not found"))),
        }
    }
}
