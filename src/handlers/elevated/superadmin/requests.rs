// handlers/elevated/superadmin/requests.rs - /api/admin/admin-requests handlers

use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::utils::JsonBody;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleRequest {
    pub user_id: Uuid,
    /// "approve" or "reject"
    #[serde(default)]
    pub action: String,
    /// Overrides the department named in the request
    pub department: Option<String>,
}

/// GET /api/admin/admin-requests/pending
pub async fn admin_requests_pending_get(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(UserService::new(&state).pending_requests().await?))
}

/// POST /api/admin/admin-requests/handle
///
/// Approval promotes to admin, assigns the department and clears the request
/// in a single write. Either way the requester is notified.
pub async fn admin_requests_handle_post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<HandleRequest>,
) -> ApiResult<User> {
    let approve = match body.action.trim().to_ascii_lowercase().as_str() {
        "approve" | "approved" => true,
        "reject" | "rejected" => false,
        other => {
            return Err(ApiError::invalid_field(
                "action",
                format!("'{}' must be 'approve' or 'reject'", other),
            ))
        }
    };

    let user = UserService::new(&state)
        .handle_request(body.user_id, approve, body.department.as_deref())
        .await?;
    let message = if approve {
        "Admin request approved"
    } else {
        "Admin request rejected"
    };
    Ok(ApiResponse::success(user).with_message(message))
}
