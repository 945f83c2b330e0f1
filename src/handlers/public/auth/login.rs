// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::database::models::Role;
use crate::handlers::utils::JsonBody;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub name: String,
}

/**
 * POST /api/auth/login - Authenticate and receive a JWT
 *
 * Input: `{ "email": "...", "password": "..." }`
 * Output: `{ "success": true, "data": { "token", "role", "name" } }`
 *
 * Unknown email and wrong password both answer 401 with the same message.
 */
pub async fn login_post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let session = UserService::new(&state)
        .login(&body.email, &body.password)
        .await?;

    Ok(ApiResponse::success(LoginResponse {
        token: session.token,
        role: session.role,
        name: session.name,
    })
    .with_message("Login successful"))
}
