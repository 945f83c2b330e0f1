// handlers/elevated/superadmin/users.rs - /api/admin/users handlers

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{Role, User};
use crate::error::ApiError;
use crate::handlers::utils::{parse_id, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::UserService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    #[serde(default)]
    pub role: String,
    pub department: Option<String>,
}

/// GET /api/admin/users
pub async fn users_get(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(UserService::new(&state).list_users().await?))
}

/// PUT /api/admin/users/:id/role - 409 when it would leave no superadmin
pub async fn user_role_put(
    State(state): State<AppState>,
    Extension(ValidatedUser(actor)): Extension<ValidatedUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<RoleRequest>,
) -> ApiResult<User> {
    let id = parse_id(&id, "id")?;
    let role = body
        .role
        .trim()
        .parse::<Role>()
        .map_err(|e| ApiError::invalid_field("role", e))?;

    let user = UserService::new(&state)
        .change_role(&actor, id, role, body.department.as_deref())
        .await?;
    Ok(ApiResponse::success(user).with_message("Role updated"))
}

/// DELETE /api/admin/users/:id - superadmin accounts answer 403
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(ValidatedUser(actor)): Extension<ValidatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id, "id")?;
    UserService::new(&state).delete_user(&actor, id).await?;
    Ok(ApiResponse::success(json!({ "id": id })).with_message("User deleted"))
}
