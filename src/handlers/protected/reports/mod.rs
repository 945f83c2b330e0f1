// handlers/protected/reports/mod.rs - Report endpoints for every authenticated role
//
// POST   /api/reports                - submit (JSON or multipart with `attachment`)
// GET    /api/reports                - list, scoped by role
// GET    /api/reports/:id            - single report with owner
// PUT    /api/reports/:id            - owner edit while Pending
// DELETE /api/reports/:id            - owner delete while Pending
// GET    /api/reports/:id/attachment - download

pub mod attachment;
pub mod create;
pub mod list;
pub mod record;

pub use attachment::report_attachment_get;
pub use create::report_post;
pub use list::reports_get;
pub use record::{report_delete, report_get, report_put};

use serde::Deserialize;

use crate::database::models::{Category, ReportFilter, ReportStatus};
use crate::error::ApiError;
use crate::handlers::utils::parse_optional;

/// `?category=&status=` shared by the user and admin listings
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub category: Option<String>,
    pub status: Option<String>,
}

impl ReportQuery {
    pub fn to_filter(&self) -> Result<ReportFilter, ApiError> {
        Ok(ReportFilter {
            category: parse_optional::<Category>(self.category.as_deref(), "category")?,
            status: parse_optional::<ReportStatus>(self.status.as_deref(), "status")?,
        })
    }
}
