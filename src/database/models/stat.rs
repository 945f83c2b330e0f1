use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Periodic financial snapshot recorded by reviewers for dashboard charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stat {
    pub id: Uuid,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub total_inventory: Decimal,
    pub submitted_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStat {
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub total_inventory: Decimal,
    pub submitted_by: Uuid,
}
