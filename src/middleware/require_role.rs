use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::validate_user::ValidatedUser;
use crate::database::models::Role;
use crate::error::ApiError;

/// Route-level role whitelist. Runs after `validate_user_middleware`.
///
/// ```ignore
/// router.route_layer(middleware::from_fn_with_state(Role::REVIEWERS, require_roles))
/// ```
pub async fn require_roles(
    State(allowed): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let role = request
        .extensions()
        .get::<ValidatedUser>()
        .map(|ValidatedUser(user)| user.role)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !allowed.contains(&role) {
        return Err(ApiError::forbidden(format!(
            "Role '{}' is not authorized to access this route",
            role
        )));
    }

    Ok(next.run(request).await)
}
