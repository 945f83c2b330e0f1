// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: any authenticated role
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware -> validate_user_middleware
//
// Handlers receive the stored account through `Extension<ValidatedUser>`;
// ownership and department checks happen in the service layer.

pub mod account; // whoami, request-admin
pub mod notifications; // per-user notification list
pub mod reports; // submission, listing, owner edits, attachments

pub use account::*;
pub use notifications::*;
pub use reports::*;
