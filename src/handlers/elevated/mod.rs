// handlers/elevated/mod.rs - Elevated handlers (reviewer or superadmin role required)
//
// Security Level: JWT + stored role check
// Middleware: jwt_auth_middleware -> validate_user_middleware -> require_roles
//
// admin/      - admin and superadmin (Role::REVIEWERS)
// superadmin/ - superadmin only (Role::SUPERADMIN_ONLY)

pub mod admin;
pub mod superadmin;
