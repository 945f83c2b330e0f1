// handlers/protected/account/mod.rs - Account endpoints for the signed-in user

pub mod request_admin; // POST /api/users/request-admin
pub mod whoami; // GET /api/auth/whoami

pub use request_admin::request_admin_post;
pub use whoami::whoami_get;
