use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::database::models::User;
use crate::database::store::UserStore;
use crate::error::ApiError;
use crate::state::AppState;

/// Stored user behind the token, injected for handlers
#[derive(Clone, Debug)]
pub struct ValidatedUser(pub User);

/// Loads the token's user and rejects tokens that no longer match the stored
/// account (deleted user, or role changed since the token was issued)
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let user = state.store.find_user(auth_user.id).await?.ok_or_else(|| {
        tracing::warn!("User validation failed: user {} no longer exists", auth_user.id);
        ApiError::forbidden("User account no longer exists")
    })?;

    if user.role != auth_user.role {
        tracing::warn!(
            "User validation failed: token role '{}' doesn't match stored role '{}' for {}",
            auth_user.role,
            user.role,
            user.id
        );
        return Err(ApiError::forbidden("User access level mismatch, please log in again"));
    }

    tracing::debug!("User validation successful: {} ({})", user.email, user.role);

    request.extensions_mut().insert(ValidatedUser(user));
    Ok(next.run(request).await)
}
