// handlers/elevated/superadmin/notifications.rs - System-wide and direct sends
//
// POST /api/admin/notifications     - fan out to a role target
// GET  /api/admin/notifications/all - history of system sends
// POST /api/notifications/send      - direct message to one user

use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Notification, NotificationKind, SystemNotification, Target};
use crate::handlers::utils::{parse_optional, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::{NotificationService, SystemDelivery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SystemNotificationRequest {
    #[serde(default)]
    pub message: String,
    /// all | user | admin | superadmin, defaults to all
    pub target: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub async fn system_notifications_post(
    State(state): State<AppState>,
    Extension(ValidatedUser(sender)): Extension<ValidatedUser>,
    JsonBody(body): JsonBody<SystemNotificationRequest>,
) -> ApiResult<SystemDelivery> {
    let target = parse_optional::<Target>(body.target.as_deref(), "target")?.unwrap_or(Target::All);
    let delivery = NotificationService::new(&state)
        .send_system(sender.id, &body.message, target)
        .await?;
    let message = format!(
        "Notification sent to {} users",
        delivery.notification.recipients
    );
    Ok(ApiResponse::created(delivery).with_message(message))
}

pub async fn system_notifications_get(State(state): State<AppState>) -> ApiResult<Vec<SystemNotification>> {
    Ok(ApiResponse::success(NotificationService::new(&state).list_system().await?))
}

pub async fn notification_send_post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SendRequest>,
) -> ApiResult<Notification> {
    let kind =
        parse_optional::<NotificationKind>(body.kind.as_deref(), "type")?.unwrap_or(NotificationKind::Info);
    let notification = NotificationService::new(&state)
        .send_to_user(body.user_id, &body.message, kind)
        .await?;
    Ok(ApiResponse::created(notification).with_message("Notification sent"))
}
