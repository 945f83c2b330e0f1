// handlers/elevated/admin/reports.rs - Reviewer report endpoints
//
// GET /api/admin/reports                 - review queue, department scoped
// PUT /api/reports/:id/status            - Pending -> Approved | Rejected
// PUT /api/admin/reports/:id             - same transition, admin route
// PUT /api/reports/:id/summary           - annotate adminSummary
// PUT /api/admin/reports/:id/summary     - same annotation, admin route

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::database::models::{Report, ReportStatus, ReportView};
use crate::error::ApiError;
use crate::handlers::protected::reports::ReportQuery;
use crate::handlers::utils::{parse_id, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::{ReportService, SummaryInput};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub revenue: Option<Decimal>,
    pub profit: Option<Decimal>,
    pub inventory_value: Option<Decimal>,
    pub notes: Option<String>,
}

pub async fn admin_reports_get(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Vec<ReportView>> {
    let filter = query.to_filter()?;
    let reports = ReportService::new(&state).list_for_review(&user, filter).await?;
    Ok(ApiResponse::success(reports))
}

/// Stamps `reviewedBy`/`reviewedAt`. 409 when the report is no longer Pending,
/// including when a concurrent reviewer got there first.
pub async fn report_status_put(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<StatusRequest>,
) -> ApiResult<Report> {
    let id = parse_id(&id, "id")?;
    let status = body
        .status
        .parse::<ReportStatus>()
        .map_err(|e| ApiError::invalid_field("status", e))?;

    let report = ReportService::new(&state).review(&user, id, status).await?;
    let message = format!("Report {}", report.status.as_str().to_lowercase());
    Ok(ApiResponse::success(report).with_message(message))
}

pub async fn report_summary_put(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<SummaryRequest>,
) -> ApiResult<Report> {
    let id = parse_id(&id, "id")?;
    let report = ReportService::new(&state)
        .annotate(
            &user,
            id,
            SummaryInput {
                revenue: body.revenue,
                profit: body.profit,
                inventory_value: body.inventory_value,
                notes: body.notes,
            },
        )
        .await?;
    Ok(ApiResponse::success(report).with_message("Summary updated"))
}
