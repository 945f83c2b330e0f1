// handlers/elevated/admin/overview.rs - GET /api/admin/overview handler

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{Overview, OverviewService};
use crate::state::AppState;

pub async fn overview_get(State(state): State<AppState>) -> ApiResult<Overview> {
    let overview = OverviewService::new(&state).overview().await?;
    Ok(ApiResponse::success(overview))
}
