use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::database::models::{NewStat, Stat, User};
use crate::database::store::{StatStore, Store};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct StatInput {
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub total_inventory: Decimal,
}

pub struct StatService {
    store: Arc<dyn Store>,
}

impl StatService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
        }
    }

    pub async fn record(&self, submitter: &User, input: StatInput) -> ServiceResult<Stat> {
        let stat = self
            .store
            .insert_stat(NewStat {
                total_revenue: input.total_revenue,
                total_profit: input.total_profit,
                total_inventory: input.total_inventory,
                submitted_by: submitter.id,
            })
            .await?;
        info!("Stat snapshot {} recorded by {}", stat.id, submitter.email);
        Ok(stat)
    }

    /// Oldest first, for charting
    pub async fn list(&self) -> ServiceResult<Vec<Stat>> {
        Ok(self.store.list_stats().await?)
    }

    pub async fn latest(&self) -> ServiceResult<Stat> {
        self.store
            .latest_stat()
            .await?
            .ok_or_else(|| ServiceError::NotFound("No stats found".to_string()))
    }
}
