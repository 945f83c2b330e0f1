pub mod auth;
pub mod require_role;
pub mod response;
pub mod validate_user;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use require_role::require_roles;
pub use response::{ApiResponse, ApiResult};
pub use validate_user::{validate_user_middleware, ValidatedUser};
