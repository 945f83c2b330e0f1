use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{
    AdminRequest, AdminSummary, NewReport, NewStat, NewUser, Notification, NotificationKind,
    ReadOutcome, RecipientNotification, Report, ReportFilter, ReportPatch, ReportScope,
    ReportStatus, Review, Role, Stat, SystemNotification, Target, User,
};
use crate::database::store::{
    can_open_request, NotificationStore, ReportStore, RoleChange, StatStore, Store, StoreError,
    StoreResult, UserStore,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    reports: HashMap<Uuid, Report>,
    notifications: Vec<Notification>,
    system_notifications: Vec<SystemNotification>,
    stats: Vec<Stat>,
}

/// Process-local store used when no `DATABASE_URL` is configured, and by tests.
/// Every write happens under one lock, which gives the same per-record atomicity
/// as the Postgres store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let email = new_user.email.to_lowercase();
        if tables.users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict(format!("email '{}' is already registered", email)));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            department: new_user.department,
            admin_request: AdminRequest::None,
            requested_department: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.tables.read().await.users.values().cloned().collect();
        newest_first(&mut users, |u| u.created_at);
        Ok(users)
    }

    async fn users_with_roles(&self, roles: &[Role]) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| roles.contains(&u.role))
            .cloned()
            .collect())
    }

    async fn count_users_by_role(&self) -> StoreResult<HashMap<Role, i64>> {
        let tables = self.tables.read().await;
        let mut counts = HashMap::new();
        for user in tables.users.values() {
            *counts.entry(user.role).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn update_user_role(
        &self,
        id: Uuid,
        role: Role,
        department: Option<String>,
    ) -> StoreResult<RoleChange> {
        let mut tables = self.tables.write().await;
        let superadmins = tables
            .users
            .values()
            .filter(|u| u.role == Role::Superadmin)
            .count();
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(RoleChange::NotFound);
        };

        let previous = user.role;
        if previous == Role::Superadmin && role != Role::Superadmin && superadmins <= 1 {
            return Ok(RoleChange::LastSuperadmin);
        }
        user.role = role;
        if department.is_some() {
            user.department = department;
        }
        if role != Role::User {
            user.admin_request = AdminRequest::None;
            user.requested_department = None;
        }
        user.updated_at = Utc::now();
        Ok(RoleChange::Updated {
            previous,
            user: user.clone(),
        })
    }

    async fn open_admin_request(
        &self,
        id: Uuid,
        department: Option<String>,
    ) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if !can_open_request(user) {
            return Ok(None);
        }
        user.admin_request = AdminRequest::Pending;
        user.requested_department = department;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn resolve_admin_request(
        &self,
        id: Uuid,
        approve: bool,
        department: Option<String>,
    ) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if user.admin_request != AdminRequest::Pending || user.role != Role::User {
            return Ok(None);
        }
        if approve {
            user.role = Role::Admin;
            user.department = department.or_else(|| user.requested_department.clone());
            user.admin_request = AdminRequest::None;
        } else {
            user.admin_request = AdminRequest::Rejected;
        }
        user.requested_department = None;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn pending_admin_requests(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| u.admin_request == AdminRequest::Pending)
            .cloned()
            .collect();
        newest_first(&mut users, |u| u.updated_at);
        Ok(users)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.users.remove(&id).is_some();
        if removed {
            tables.notifications.retain(|n| n.user_id != id);
            tables.reports.retain(|_, r| r.user_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn insert_report(&self, new_report: NewReport) -> StoreResult<Report> {
        let now = Utc::now();
        let report = Report {
            id: Uuid::new_v4(),
            title: new_report.title,
            description: new_report.description,
            category: new_report.category,
            urgency: new_report.urgency,
            user_id: new_report.user_id,
            status: ReportStatus::Pending,
            attachment: new_report.attachment,
            reviewed_by: None,
            reviewed_at: None,
            admin_summary: AdminSummary::default(),
            created_at: now,
            updated_at: now,
        };
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&report.user_id) {
            return Err(StoreError::NotFound(format!("user {} not found", report.user_id)));
        }
        tables.reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn find_report(&self, id: Uuid) -> StoreResult<Option<Report>> {
        Ok(self.tables.read().await.reports.get(&id).cloned())
    }

    async fn list_reports(&self, scope: &ReportScope, filter: &ReportFilter) -> StoreResult<Vec<Report>> {
        let tables = self.tables.read().await;
        let mut reports: Vec<Report> = tables
            .reports
            .values()
            .filter(|r| scope.admits(r) && filter.admits(r))
            .cloned()
            .collect();
        newest_first(&mut reports, |r| r.created_at);
        Ok(reports)
    }

    async fn update_pending_report(&self, id: Uuid, patch: ReportPatch) -> StoreResult<Option<Report>> {
        let mut tables = self.tables.write().await;
        let Some(report) = tables.reports.get_mut(&id) else {
            return Ok(None);
        };
        if !report.status.is_pending() {
            return Ok(None);
        }
        if let Some(title) = patch.title {
            report.title = title;
        }
        if let Some(description) = patch.description {
            report.description = description;
        }
        if let Some(category) = patch.category {
            report.category = category;
        }
        if let Some(urgency) = patch.urgency {
            report.urgency = urgency;
        }
        report.updated_at = Utc::now();
        Ok(Some(report.clone()))
    }

    async fn review_report(&self, id: Uuid, review: Review) -> StoreResult<Option<Report>> {
        let mut tables = self.tables.write().await;
        let Some(report) = tables.reports.get_mut(&id) else {
            return Ok(None);
        };
        if !report.status.is_pending() {
            return Ok(None);
        }
        report.status = review.status;
        report.reviewed_by = Some(review.reviewer);
        report.reviewed_at = Some(review.at);
        report.updated_at = review.at;
        Ok(Some(report.clone()))
    }

    async fn update_summary(&self, id: Uuid, summary: AdminSummary) -> StoreResult<Option<Report>> {
        let mut tables = self.tables.write().await;
        let Some(report) = tables.reports.get_mut(&id) else {
            return Ok(None);
        };
        report.admin_summary = summary;
        report.updated_at = Utc::now();
        Ok(Some(report.clone()))
    }

    async fn delete_pending_report(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.reports.get(&id) {
            Some(report) if report.status.is_pending() => {
                tables.reports.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn report_status_counts(&self) -> StoreResult<HashMap<ReportStatus, i64>> {
        let tables = self.tables.read().await;
        let mut counts = HashMap::new();
        for report in tables.reports.values() {
            *counts.entry(report.status).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn locator_in_use(&self, locator: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .reports
            .values()
            .any(|r| r.attachment.as_ref().is_some_and(|a| a.locator == locator)))
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn push_notification(
        &self,
        user_id: Uuid,
        message: &str,
        kind: NotificationKind,
    ) -> StoreResult<Notification> {
        let mut created = self.push_notifications(&[user_id], message, kind).await?;
        created
            .pop()
            .ok_or_else(|| StoreError::NotFound(format!("user {} not found", user_id)))
    }

    async fn push_notifications(
        &self,
        user_ids: &[Uuid],
        message: &str,
        kind: NotificationKind,
    ) -> StoreResult<Vec<Notification>> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let created: Vec<Notification> = user_ids
            .iter()
            .filter(|id| tables.users.contains_key(id))
            .map(|user_id| Notification {
                id: Uuid::new_v4(),
                user_id: *user_id,
                message: message.to_string(),
                kind,
                read: false,
                read_at: None,
                created_at: now,
            })
            .collect();
        tables.notifications.extend(created.iter().cloned());
        Ok(created)
    }

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let tables = self.tables.read().await;
        let mut list: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut list, |n| n.created_at);
        Ok(list)
    }

    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<ReadOutcome>> {
        let mut tables = self.tables.write().await;
        let Some(notification) = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
        else {
            return Ok(None);
        };

        let changed = !notification.read;
        if changed {
            notification.read = true;
            notification.read_at = Some(at);
        }
        Ok(Some(ReadOutcome {
            notification: notification.clone(),
            changed,
        }))
    }

    async fn clear_notifications(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.notifications.len();
        tables.notifications.retain(|n| n.user_id != user_id);
        Ok((before - tables.notifications.len()) as u64)
    }

    async fn list_all_notifications(&self) -> StoreResult<Vec<RecipientNotification>> {
        let tables = self.tables.read().await;
        let mut list: Vec<RecipientNotification> = tables
            .notifications
            .iter()
            .filter_map(|n| {
                tables.users.get(&n.user_id).map(|u| RecipientNotification {
                    notification: n.clone(),
                    recipient: u.summary(),
                })
            })
            .collect();
        newest_first(&mut list, |n| n.notification.created_at);
        Ok(list)
    }

    async fn insert_system_notification(
        &self,
        message: &str,
        target: Target,
        sent_by: Uuid,
        recipients: i64,
    ) -> StoreResult<SystemNotification> {
        let record = SystemNotification {
            id: Uuid::new_v4(),
            message: message.to_string(),
            target,
            sent_by,
            recipients,
            created_at: Utc::now(),
        };
        self.tables.write().await.system_notifications.push(record.clone());
        Ok(record)
    }

    async fn list_system_notifications(&self) -> StoreResult<Vec<SystemNotification>> {
        let mut list = self.tables.read().await.system_notifications.clone();
        newest_first(&mut list, |n| n.created_at);
        Ok(list)
    }
}

#[async_trait]
impl StatStore for MemoryStore {
    async fn insert_stat(&self, new_stat: NewStat) -> StoreResult<Stat> {
        let stat = Stat {
            id: Uuid::new_v4(),
            total_revenue: new_stat.total_revenue,
            total_profit: new_stat.total_profit,
            total_inventory: new_stat.total_inventory,
            submitted_by: new_stat.submitted_by,
            created_at: Utc::now(),
        };
        self.tables.write().await.stats.push(stat.clone());
        Ok(stat)
    }

    async fn list_stats(&self) -> StoreResult<Vec<Stat>> {
        let mut stats = self.tables.read().await.stats.clone();
        stats.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(stats)
    }

    async fn latest_stat(&self) -> StoreResult<Option<Stat>> {
        // Insertion order breaks ties between equal timestamps
        let tables = self.tables.read().await;
        Ok(tables
            .stats
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.created_at.cmp(&b.created_at).then(ia.cmp(ib)))
            .map(|(_, s)| s.clone()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Attachment, Category};

    async fn seeded_user(store: &MemoryStore, email: &str, role: Role) -> User {
        store
            .create_user(NewUser {
                name: email.to_string(),
                email: email.to_string(),
                password_hash: "hash".to_string(),
                role,
                department: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        seeded_user(&store, "a@example.com", Role::User).await;
        let err = store
            .create_user(NewUser {
                name: "again".to_string(),
                email: "A@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
                department: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn review_only_applies_to_pending_reports() {
        let store = MemoryStore::new();
        let owner = seeded_user(&store, "owner@example.com", Role::User).await;
        let reviewer = Uuid::new_v4();
        let report = store
            .insert_report(NewReport {
                title: "Q1".to_string(),
                description: "d".to_string(),
                category: Category::Finance,
                urgency: "Normal".to_string(),
                user_id: owner.id,
                attachment: None,
            })
            .await
            .unwrap();

        let review = Review {
            status: ReportStatus::Approved,
            reviewer,
            at: Utc::now(),
        };
        let first = store.review_report(report.id, review.clone()).await.unwrap();
        assert!(first.is_some());

        let second = store
            .review_report(
                report.id,
                Review {
                    status: ReportStatus::Rejected,
                    ..review
                },
            )
            .await
            .unwrap();
        assert!(second.is_none());

        let stored = store.find_report(report.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReportStatus::Approved);
        assert!(!store.delete_pending_report(report.id).await.unwrap());
    }

    #[tokio::test]
    async fn mark_read_twice_changes_once() {
        let store = MemoryStore::new();
        let user = seeded_user(&store, "reader@example.com", Role::User).await;
        let n = store
            .push_notification(user.id, "hello", NotificationKind::Info)
            .await
            .unwrap();

        let first = store.mark_notification_read(user.id, n.id, Utc::now()).await.unwrap().unwrap();
        let second = store.mark_notification_read(user.id, n.id, Utc::now()).await.unwrap().unwrap();

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(first.notification.read_at, second.notification.read_at);
        assert_eq!(store.list_notifications(user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn approval_clears_request_and_promotes() {
        let store = MemoryStore::new();
        let user = seeded_user(&store, "hopeful@example.com", Role::User).await;

        let opened = store
            .open_admin_request(user.id, Some("Sales Report".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(opened.admin_request, AdminRequest::Pending);
        assert!(store.open_admin_request(user.id, None).await.unwrap().is_none());

        let promoted = store.resolve_admin_request(user.id, true, None).await.unwrap().unwrap();
        assert_eq!(promoted.role, Role::Admin);
        assert_eq!(promoted.admin_request, AdminRequest::None);
        assert_eq!(promoted.department.as_deref(), Some("Sales Report"));
        assert!(store.resolve_admin_request(user.id, true, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn role_change_closes_open_request() {
        let store = MemoryStore::new();
        let user = seeded_user(&store, "hopeful@example.com", Role::User).await;
        store.open_admin_request(user.id, None).await.unwrap().unwrap();

        let RoleChange::Updated { previous, user: changed } = store
            .update_user_role(user.id, Role::Superadmin, None)
            .await
            .unwrap()
        else {
            panic!("role change refused");
        };
        assert_eq!(previous, Role::User);
        assert_eq!(changed.admin_request, AdminRequest::None);

        // Nothing stale left to approve
        assert!(store.resolve_admin_request(user.id, true, None).await.unwrap().is_none());
        assert_eq!(store.find_user(user.id).await.unwrap().unwrap().role, Role::Superadmin);
    }

    #[tokio::test]
    async fn concurrent_demotions_keep_one_superadmin() {
        let store = MemoryStore::new();
        let first = seeded_user(&store, "first@example.com", Role::Superadmin).await;
        let second = seeded_user(&store, "second@example.com", Role::Superadmin).await;

        let (a, b) = tokio::join!(
            store.update_user_role(first.id, Role::Admin, None),
            store.update_user_role(second.id, Role::Admin, None),
        );
        let outcomes = [a.unwrap(), b.unwrap()];
        let updated = outcomes
            .iter()
            .filter(|o| matches!(o, RoleChange::Updated { .. }))
            .count();
        let refused = outcomes
            .iter()
            .filter(|o| matches!(o, RoleChange::LastSuperadmin))
            .count();
        assert_eq!((updated, refused), (1, 1));

        let counts = store.count_users_by_role().await.unwrap();
        assert_eq!(counts.get(&Role::Superadmin), Some(&1));
    }

    #[tokio::test]
    async fn reports_need_an_existing_owner() {
        let store = MemoryStore::new();
        let err = store
            .insert_report(NewReport {
                title: "Orphan".to_string(),
                description: "d".to_string(),
                category: Category::Sales,
                urgency: "Normal".to_string(),
                user_id: Uuid::new_v4(),
                attachment: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn locator_use_tracks_stored_reports() {
        let store = MemoryStore::new();
        let owner = seeded_user(&store, "owner@example.com", Role::User).await;
        assert!(!store.locator_in_use("abc.txt").await.unwrap());

        let report = store
            .insert_report(NewReport {
                title: "Q2".to_string(),
                description: "d".to_string(),
                category: Category::Finance,
                urgency: "Normal".to_string(),
                user_id: owner.id,
                attachment: Some(Attachment {
                    locator: "abc.txt".to_string(),
                    file_name: "q2.txt".to_string(),
                    mime_type: "text/plain".to_string(),
                    size: 3,
                }),
            })
            .await
            .unwrap();
        assert!(store.locator_in_use("abc.txt").await.unwrap());

        assert!(store.delete_pending_report(report.id).await.unwrap());
        assert!(!store.locator_in_use("abc.txt").await.unwrap());
    }
}
