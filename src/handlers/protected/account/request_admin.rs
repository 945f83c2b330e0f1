// handlers/protected/account/request_admin.rs - POST /api/users/request-admin handler

use axum::{extract::State, Extension};
use serde::Deserialize;

use crate::database::models::User;
use crate::handlers::utils::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::UserService;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AdminAccessRequest {
    /// Category label the user wants to review, e.g. "Sales Report"
    pub department: Option<String>,
}

/// POST /api/users/request-admin - open a promotion request
///
/// 403 for admins and superadmins, 409 while a request is already pending.
pub async fn request_admin_post(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    body: Option<JsonBody<AdminAccessRequest>>,
) -> ApiResult<User> {
    let request = body.map(|JsonBody(b)| b).unwrap_or_default();
    let updated = UserService::new(&state)
        .request_admin(&user, request.department.as_deref())
        .await?;

    Ok(ApiResponse::success(updated).with_message("Admin access request submitted"))
}
