// handlers/protected/reports/record.rs - GET/PUT/DELETE /api/reports/:id handlers

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{Report, ReportView};
use crate::handlers::utils::{parse_id, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::{PartialDraft, ReportService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateReportRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<String>,
}

pub async fn report_get(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Path(id): Path<String>,
) -> ApiResult<ReportView> {
    let id = parse_id(&id, "id")?;
    let report = ReportService::new(&state).get(&user, id).await?;
    Ok(ApiResponse::success(report))
}

/// Owner edit. 403 for anyone else, 409 once the report has been reviewed.
pub async fn report_put(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateReportRequest>,
) -> ApiResult<Report> {
    let id = parse_id(&id, "id")?;
    let report = ReportService::new(&state)
        .update(
            &user,
            id,
            PartialDraft {
                title: body.title,
                description: body.description,
                category: body.category,
                urgency: body.urgency,
            },
        )
        .await?;
    Ok(ApiResponse::success(report).with_message("Report updated"))
}

/// Same ownership and status rules as the edit
pub async fn report_delete(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id, "id")?;
    ReportService::new(&state).delete(&user, id).await?;
    Ok(ApiResponse::success(json!({ "id": id })).with_message("Report deleted"))
}
