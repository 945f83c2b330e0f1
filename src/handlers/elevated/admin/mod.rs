// handlers/elevated/admin/mod.rs - Reviewer endpoints
//
// Admins are scoped to reports whose category equals their department;
// superadmins pass every scope check.

pub mod notifications; // GET /api/notifications/admin/all, /api/notifications/user/:user_id
pub mod overview; // GET /api/admin/overview
pub mod reports; // review queue, status changes, summaries
pub mod stats; // GET/POST /api/stats, GET /api/stats/latest

pub use notifications::{notifications_all_get, notifications_for_user_get};
pub use overview::overview_get;
pub use reports::{admin_reports_get, report_status_put, report_summary_put};
pub use stats::{stats_get, stats_latest_get, stats_post};
