// handlers/elevated/superadmin/mod.rs - Superadmin-only endpoints

pub mod notifications; // system-wide sends and history
pub mod requests; // promotion queue
pub mod users; // role changes and hard deletes

pub use notifications::{notification_send_post, system_notifications_get, system_notifications_post};
pub use requests::{admin_requests_handle_post, admin_requests_pending_get};
pub use users::{user_delete, user_role_put, users_get};
