// handlers/elevated/admin/notifications.rs - Reviewer notification views

use axum::extract::{Path, State};

use crate::database::models::RecipientNotification;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::NotificationService;
use crate::state::AppState;

/// GET /api/notifications/admin/all - every stored notification with its recipient
pub async fn notifications_all_get(State(state): State<AppState>) -> ApiResult<Vec<RecipientNotification>> {
    let notifications = NotificationService::new(&state).list_all().await?;
    Ok(ApiResponse::success(notifications))
}

/// GET /api/notifications/user/:user_id
pub async fn notifications_for_user_get(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<RecipientNotification>> {
    let user_id = parse_id(&user_id, "user_id")?;
    let notifications = NotificationService::new(&state).list_for_user(user_id).await?;
    Ok(ApiResponse::success(notifications))
}
