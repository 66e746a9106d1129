use crate::models::session::SessionStatus;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Illegal transition: cannot {action} a session that is {from}{}", .reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
    IllegalTransition {
        from: SessionStatus,
        action: &'static str,
        reason: Option<String>,
    },
    #[error("Out of window: {0}")]
    OutOfWindow(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid identifier")]
    UuidError {
        message: String,
        #[source]
        source: uuid::Error,
    },
    #[error("{message}: {source}")]
    ConfigurationError {
        message: String,
        #[source]
        source: figment::Error,
    },
}

/// Coarse classification of an [`AppError`], used by callers to decide how to
/// surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidInput,
    Conflict,
    IllegalTransition,
    OutOfWindow,
    NotFound,
    Internal,
}

impl AppError {
    pub fn uuid(message: impl Into<String>, source: uuid::Error) -> Self {
        Self::UuidError {
            message: message.into(),
            source,
        }
    }

    pub fn illegal(from: SessionStatus, action: &'static str) -> Self {
        Self::IllegalTransition { from, action, reason: None }
    }

    pub fn illegal_because(from: SessionStatus, action: &'static str, reason: impl Into<String>) -> Self {
        Self::IllegalTransition {
            from,
            action,
            reason: Some(reason.into()),
        }
    }

    /// Only conflicts are worth retrying, after re-resolving availability.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            AppError::Conflict(_) => "This time slot is no longer available".to_string(),
            AppError::IllegalTransition { from, action, .. } => format!("This session is {from} and cannot be {}", past_tense(action)),
            AppError::OutOfWindow(_) => "This action is not available at this time".to_string(),
            AppError::NotFound(what) => what.clone(),
            AppError::InvalidInput(_) | AppError::ValidationError(_) | AppError::UuidError { .. } => self.to_string(),
            AppError::ConfigurationError { .. } => "Something went wrong".to_string(),
        }
    }
}

fn past_tense(action: &str) -> &str {
    match action {
        "confirm" => "confirmed",
        "cancel" => "cancelled",
        "start" => "started",
        "complete" => "completed",
        "mark as no-show" => "marked as no-show",
        other => other,
    }
}

impl From<&AppError> for ErrorCategory {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::InvalidInput(_) => ErrorCategory::InvalidInput,
            AppError::ValidationError(_) => ErrorCategory::InvalidInput,
            AppError::UuidError { .. } => ErrorCategory::InvalidInput,
            AppError::Conflict(_) => ErrorCategory::Conflict,
            AppError::IllegalTransition { .. } => ErrorCategory::IllegalTransition,
            AppError::OutOfWindow(_) => ErrorCategory::OutOfWindow,
            AppError::NotFound(_) => ErrorCategory::NotFound,
            AppError::ConfigurationError { .. } => ErrorCategory::Internal,
        }
    }
}

impl From<uuid::Error> for AppError {
    fn from(e: uuid::Error) -> Self {
        AppError::uuid("Invalid UUID", e)
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::ConfigurationError {
            message: "Failed to read configuration".to_string(),
            source: e,
        }
    }
}
