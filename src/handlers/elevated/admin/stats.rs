// handlers/elevated/admin/stats.rs - /api/stats snapshot endpoints

use axum::{extract::State, Extension};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::database::models::Stat;
use crate::handlers::utils::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::{StatInput, StatService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatRequest {
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub total_inventory: Decimal,
}

/// GET /api/stats - oldest first
pub async fn stats_get(State(state): State<AppState>) -> ApiResult<Vec<Stat>> {
    Ok(ApiResponse::success(StatService::new(&state).list().await?))
}

/// POST /api/stats
pub async fn stats_post(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    JsonBody(body): JsonBody<StatRequest>,
) -> ApiResult<Stat> {
    let stat = StatService::new(&state)
        .record(
            &user,
            StatInput {
                total_revenue: body.total_revenue,
                total_profit: body.total_profit,
                total_inventory: body.total_inventory,
            },
        )
        .await?;
    Ok(ApiResponse::created(stat).with_message("Stats recorded"))
}

/// GET /api/stats/latest - 404 until the first snapshot exists
pub async fn stats_latest_get(State(state): State<AppState>) -> ApiResult<Stat> {
    Ok(ApiResponse::success(StatService::new(&state).latest().await?))
}
