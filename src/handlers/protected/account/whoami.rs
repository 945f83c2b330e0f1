// handlers/protected/account/whoami.rs - GET /api/auth/whoami handler

use axum::Extension;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};

/// GET /api/auth/whoami - the stored account behind the token
pub async fn whoami_get(Extension(ValidatedUser(user)): Extension<ValidatedUser>) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}
