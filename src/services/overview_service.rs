use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::ServiceResult;
use crate::database::models::{ReportStatus, Role};
use crate::database::store::{ReportStore, Store, UserStore};
use crate::realtime::Hub;
use crate::state::AppState;

/// Dashboard counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub users: i64,
    /// Admins and superadmins together
    pub admins: i64,
    pub reports: i64,
    pub report_stats: BTreeMap<String, i64>,
    pub online_users: usize,
}

pub struct OverviewService {
    store: Arc<dyn Store>,
    hub: Hub,
}

impl OverviewService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            hub: state.hub.clone(),
        }
    }

    pub async fn overview(&self) -> ServiceResult<Overview> {
        let roles = self.store.count_users_by_role().await?;
        let statuses = self.store.report_status_counts().await?;
        let count = |role: Role| roles.get(&role).copied().unwrap_or(0);

        let report_stats: BTreeMap<String, i64> = [
            ReportStatus::Pending,
            ReportStatus::Approved,
            ReportStatus::Rejected,
        ]
        .iter()
        .map(|s| (s.as_str().to_string(), statuses.get(s).copied().unwrap_or(0)))
        .collect();

        Ok(Overview {
            users: count(Role::User),
            admins: count(Role::Admin) + count(Role::Superadmin),
            reports: report_stats.values().sum(),
            report_stats,
            online_users: self.hub.online_users(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::memory::MemoryStore;
    use crate::database::models::{Category, NewReport, NewUser, Review};
    use chrono::Utc;

    #[tokio::test]
    async fn counts_roles_and_statuses() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::with_local_storage(AppConfig::development(), store.clone());

        let mut owner = None;
        for (email, role) in [
            ("u1@example.com", Role::User),
            ("u2@example.com", Role::User),
            ("a@example.com", Role::Admin),
            ("s@example.com", Role::Superadmin),
        ] {
            let user = store
                .create_user(NewUser {
                    name: email.to_string(),
                    email: email.to_string(),
                    password_hash: "x".to_string(),
                    role,
                    department: None,
                })
                .await
                .unwrap();
            owner.get_or_insert(user.id);
        }
        let owner = owner.unwrap();

        let mut ids = Vec::new();
        for _ in 0..3 {
            let report = store
                .insert_report(NewReport {
                    title: "t".to_string(),
                    description: "d".to_string(),
                    category: Category::Sales,
                    urgency: "Normal".to_string(),
                    user_id: owner,
                    attachment: None,
                })
                .await
                .unwrap();
            ids.push(report.id);
        }
        store
            .review_report(
                ids[0],
                Review {
                    status: ReportStatus::Approved,
                    reviewer: owner,
                    at: Utc::now(),
                },
            )
            .await
            .unwrap();

        let overview = OverviewService::new(&state).overview().await.unwrap();
        assert_eq!(overview.users, 2);
        assert_eq!(overview.admins, 2);
        assert_eq!(overview.reports, 3);
        assert_eq!(overview.report_stats["Pending"], 2);
        assert_eq!(overview.report_stats["Approved"], 1);
        assert_eq!(overview.report_stats["Rejected"], 0);
    }
}
