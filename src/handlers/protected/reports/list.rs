// handlers/protected/reports/list.rs - GET /api/reports handler

use axum::{
    extract::{Query, State},
    Extension,
};

use super::ReportQuery;
use crate::database::models::ReportView;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::ReportService;
use crate::state::AppState;

/// Users see their own reports, admins their department plus their own,
/// superadmins everything. Newest first.
pub async fn reports_get(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Vec<ReportView>> {
    let filter = query.to_filter()?;
    let reports = ReportService::new(&state).list_visible(&user, filter).await?;
    Ok(ApiResponse::success(reports))
}
