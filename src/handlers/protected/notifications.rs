// handlers/protected/notifications.rs - /api/notifications for the signed-in user
//
// GET    /api/notifications          - own list, newest first
// PUT    /api/notifications/:id/read - idempotent mark-as-read
// DELETE /api/notifications/clear    - drop the whole list

use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::{json, Value};

use crate::database::models::{Notification, ReadOutcome};
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::NotificationService;
use crate::state::AppState;

pub async fn notifications_get(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
) -> ApiResult<Vec<Notification>> {
    let notifications = NotificationService::new(&state).list(user.id).await?;
    Ok(ApiResponse::success(notifications))
}

/// A second call answers 200 with `changed: false` and the original `readAt`
pub async fn notification_read_put(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Path(id): Path<String>,
) -> ApiResult<ReadOutcome> {
    let id = parse_id(&id, "id")?;
    let outcome = NotificationService::new(&state).mark_read(user.id, id).await?;
    let message = if outcome.changed {
        "Notification marked as read"
    } else {
        "Notification was already read"
    };
    Ok(ApiResponse::success(outcome).with_message(message))
}

pub async fn notifications_clear(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
) -> ApiResult<Value> {
    let removed = NotificationService::new(&state).clear(user.id).await?;
    Ok(ApiResponse::success(json!({ "removed": removed })).with_message("Notifications cleared"))
}
