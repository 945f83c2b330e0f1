// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::extract::State;
use serde::Deserialize;

use crate::database::models::User;
use crate::handlers::utils::JsonBody;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{RegisterInput, UserService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth/register - new accounts always start as `user`
pub async fn register_post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> ApiResult<User> {
    let user = UserService::new(&state)
        .register(RegisterInput {
            name: body.name,
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(ApiResponse::created(user).with_message("Registration successful"))
}
