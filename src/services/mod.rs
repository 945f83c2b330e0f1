// services/mod.rs - Business logic shared by every endpoint
//
// Handlers stay thin: they parse input, call one service method and wrap the
// result. Each service holds cheap clones of the handles it needs from
// `AppState`.

pub mod notification_service;
pub mod overview_service;
pub mod report_service;
pub mod stat_service;
pub mod user_service;

pub use notification_service::{NotificationService, SystemDelivery};
pub use overview_service::{Overview, OverviewService};
pub use report_service::{PartialDraft, ReportDraft, ReportService, SummaryInput, Upload};
pub use stat_service::{StatInput, StatService};
pub use user_service::{LoginSession, RegisterInput, UserService};

use thiserror::Error;

use crate::auth::AuthError;
use crate::database::models::{Category, TransitionError};
use crate::database::store::StoreError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{field}: {message}")]
    Invalid { field: String, message: String },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ServiceError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ServiceError::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Trimmed, non-empty text or a field error
pub(crate) fn required_text(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::invalid(field, "This field is required"));
    }
    Ok(trimmed.to_string())
}

/// Departments are category labels
pub(crate) fn parse_department(value: Option<&str>) -> ServiceResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(label) => label
            .parse::<Category>()
            .map(|c| Some(c.as_str().to_string()))
            .map_err(|e| ServiceError::invalid("department", e)),
        None => Ok(None),
    }
}
