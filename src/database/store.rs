use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    AdminRequest, AdminSummary, NewReport, NewStat, NewUser, Notification, NotificationKind,
    ReadOutcome, RecipientNotification, Report, ReportFilter, ReportPatch, ReportScope,
    ReportStatus, Review, Role, Stat, SystemNotification, Target, User,
};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a guarded role change
#[derive(Debug, Clone)]
pub enum RoleChange {
    Updated { previous: Role, user: User },
    NotFound,
    /// Refused: the user is the only remaining superadmin
    LastSuperadmin,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn users_with_roles(&self, roles: &[Role]) -> StoreResult<Vec<User>>;
    async fn count_users_by_role(&self) -> StoreResult<HashMap<Role, i64>>;
    /// Checks the last-superadmin guard and writes in one atomic step. Leaving
    /// the `user` role also clears any open admin request.
    async fn update_user_role(
        &self,
        id: Uuid,
        role: Role,
        department: Option<String>,
    ) -> StoreResult<RoleChange>;
    /// Sets `admin_request = pending` unless a request is already pending.
    /// Returns `None` when the user does not exist or is not in state to request.
    async fn open_admin_request(
        &self,
        id: Uuid,
        department: Option<String>,
    ) -> StoreResult<Option<User>>;
    /// Resolves a pending request in one write. Approval sets `role = admin`,
    /// assigns the department and clears the request; rejection records it.
    /// Returns `None` when no pending request exists or the user is no longer
    /// in the `user` role.
    async fn resolve_admin_request(
        &self,
        id: Uuid,
        approve: bool,
        department: Option<String>,
    ) -> StoreResult<Option<User>>;
    async fn pending_admin_requests(&self) -> StoreResult<Vec<User>>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Fails with `NotFound` when the owning user does not exist.
    async fn insert_report(&self, new_report: NewReport) -> StoreResult<Report>;
    async fn find_report(&self, id: Uuid) -> StoreResult<Option<Report>>;
    /// Newest first
    async fn list_reports(&self, scope: &ReportScope, filter: &ReportFilter) -> StoreResult<Vec<Report>>;
    /// Applied only while the stored status is still Pending.
    async fn update_pending_report(&self, id: Uuid, patch: ReportPatch) -> StoreResult<Option<Report>>;
    /// Applied only while the stored status is still Pending.
    async fn review_report(&self, id: Uuid, review: Review) -> StoreResult<Option<Report>>;
    async fn update_summary(&self, id: Uuid, summary: AdminSummary) -> StoreResult<Option<Report>>;
    /// Deletes only while the stored status is still Pending.
    async fn delete_pending_report(&self, id: Uuid) -> StoreResult<bool>;
    async fn report_status_counts(&self) -> StoreResult<HashMap<ReportStatus, i64>>;
    /// Whether any stored report still points at this attachment
    async fn locator_in_use(&self, locator: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn push_notification(
        &self,
        user_id: Uuid,
        message: &str,
        kind: NotificationKind,
    ) -> StoreResult<Notification>;
    /// One bulk write covering every recipient
    async fn push_notifications(
        &self,
        user_ids: &[Uuid],
        message: &str,
        kind: NotificationKind,
    ) -> StoreResult<Vec<Notification>>;
    /// Newest first
    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>>;
    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<ReadOutcome>>;
    async fn clear_notifications(&self, user_id: Uuid) -> StoreResult<u64>;
    /// Every stored notification with its recipient, newest first
    async fn list_all_notifications(&self) -> StoreResult<Vec<RecipientNotification>>;
    async fn insert_system_notification(
        &self,
        message: &str,
        target: Target,
        sent_by: Uuid,
        recipients: i64,
    ) -> StoreResult<SystemNotification>;
    async fn list_system_notifications(&self) -> StoreResult<Vec<SystemNotification>>;
}

#[async_trait]
pub trait StatStore: Send + Sync {
    async fn insert_stat(&self, new_stat: NewStat) -> StoreResult<Stat>;
    /// Oldest first
    async fn list_stats(&self) -> StoreResult<Vec<Stat>>;
    async fn latest_stat(&self) -> StoreResult<Option<Stat>>;
}

/// Everything the service layer needs from persistence
#[async_trait]
pub trait Store: UserStore + ReportStore + NotificationStore + StatStore {
    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}

/// Helper for admin request state checks shared by store implementations
pub(crate) fn can_open_request(user: &User) -> bool {
    user.role == Role::User && user.admin_request != AdminRequest::Pending
}
