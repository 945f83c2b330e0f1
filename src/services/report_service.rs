use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{required_text, NotificationService, ServiceError, ServiceResult};
use crate::database::models::{
    AdminSummary, Attachment, Category, NewReport, NotificationKind, Report, ReportFilter,
    ReportPatch, ReportScope, ReportStatus, ReportView, Review, Role, User,
};
use crate::database::store::{ReportStore, Store, UserStore};
use crate::storage::{AttachmentMeta, AttachmentStorage};
use crate::state::AppState;

/// Report fields as submitted by the owner
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub urgency: Option<String>,
}

/// Raw file received with a submission
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub meta: AttachmentMeta,
}

/// Reviewer annotation. Missing numbers count as zero.
#[derive(Debug, Clone, Default)]
pub struct SummaryInput {
    pub revenue: Option<Decimal>,
    pub profit: Option<Decimal>,
    pub inventory_value: Option<Decimal>,
    pub notes: Option<String>,
}

const DEFAULT_URGENCY: &str = "Normal";

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn Store>,
    storage: Arc<dyn AttachmentStorage>,
    notifier: NotificationService,
}

impl ReportService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            storage: Arc::clone(&state.storage),
            notifier: NotificationService::new(state),
        }
    }

    /// Submit a new Pending report, then tell the department's reviewers
    pub async fn create(
        &self,
        author: &User,
        draft: ReportDraft,
        upload: Option<Upload>,
    ) -> ServiceResult<Report> {
        let title = required_text("title", &draft.title)?;
        let description = required_text("description", &draft.description)?;
        let category = parse_category(&draft.category)?;
        let urgency = draft
            .urgency
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_URGENCY)
            .to_string();

        let attachment = match upload {
            Some(upload) => Some(self.storage.put(&upload.bytes, upload.meta).await?),
            None => None,
        };

        let inserted = self
            .store
            .insert_report(NewReport {
                title,
                description,
                category,
                urgency,
                user_id: author.id,
                attachment: attachment.clone(),
            })
            .await;
        let report = match inserted {
            Ok(report) => report,
            Err(e) => {
                if let Some(attachment) = attachment {
                    self.release_attachment(&attachment).await;
                }
                return Err(e.into());
            }
        };
        info!("Report {} submitted by {} ({})", report.id, author.email, category);

        self.announce_new_report(author, &report).await;
        Ok(report)
    }

    async fn announce_new_report(&self, author: &User, report: &Report) {
        let category = report.category.as_str();
        match self.store.users_with_roles(&[Role::Admin, Role::Superadmin]).await {
            Ok(reviewers) => {
                let (superadmins, admins): (Vec<&User>, Vec<&User>) =
                    reviewers.iter().partition(|u| u.role == Role::Superadmin);
                let department_admins: Vec<Uuid> = admins
                    .iter()
                    .filter(|u| u.department.as_deref() == Some(category))
                    .map(|u| u.id)
                    .collect();
                let superadmin_ids: Vec<Uuid> = superadmins.iter().map(|u| u.id).collect();

                self.notifier
                    .notify_quietly(
                        &department_admins,
                        &format!(
                            "New {} submitted by {}: {}",
                            category, author.name, report.title
                        ),
                        NotificationKind::Report,
                    )
                    .await;
                self.notifier
                    .notify_quietly(
                        &superadmin_ids,
                        &format!("New {} requires review: {}", category, report.title),
                        NotificationKind::Report,
                    )
                    .await;
            }
            Err(e) => warn!("Failed to load reviewers for report {}: {}", report.id, e),
        }

        self.notifier.broadcast_report_update(json!({
            "type": "new_report",
            "message": format!("New {} submitted", category),
            "reportId": report.id,
            "category": category,
            "urgency": report.urgency,
        }));
    }

    /// `/api/reports` listing: owners see their own, admins their department
    /// plus their own, superadmins everything
    pub async fn list_visible(&self, viewer: &User, filter: ReportFilter) -> ServiceResult<Vec<ReportView>> {
        let scope = match (viewer.role, viewer.department.as_ref()) {
            (Role::Superadmin, _) => ReportScope::All,
            (Role::Admin, Some(department)) => ReportScope::DepartmentOrOwner {
                department: department.clone(),
                owner: viewer.id,
            },
            _ => ReportScope::Owner(viewer.id),
        };
        let reports = self.store.list_reports(&scope, &filter).await?;
        self.with_owners(reports).await
    }

    /// Reviewer queue: strictly the admin's department, or everything for superadmins
    pub async fn list_for_review(&self, reviewer: &User, filter: ReportFilter) -> ServiceResult<Vec<ReportView>> {
        let scope = match (reviewer.role, reviewer.department.as_ref()) {
            (Role::Superadmin, _) => ReportScope::All,
            (Role::Admin, Some(department)) => ReportScope::Department(department.clone()),
            (Role::Admin, None) => return Ok(Vec::new()),
            (Role::User, _) => {
                return Err(ServiceError::Forbidden("Reviewer role required".to_string()))
            }
        };
        let reports = self.store.list_reports(&scope, &filter).await?;
        self.with_owners(reports).await
    }

    pub async fn get(&self, viewer: &User, id: Uuid) -> ServiceResult<ReportView> {
        let report = self.load(id).await?;
        if !can_view(viewer, &report) {
            return Err(ServiceError::Forbidden("Not authorized to view this report".to_string()));
        }
        let mut views = self.with_owners(vec![report]).await?;
        views
            .pop()
            .ok_or_else(|| ServiceError::NotFound("Report not found".to_string()))
    }

    /// Owner edit, allowed only while Pending
    pub async fn update(&self, owner: &User, id: Uuid, draft: PartialDraft) -> ServiceResult<Report> {
        let report = self.load(id).await?;
        if report.user_id != owner.id {
            return Err(ServiceError::Forbidden("Not authorized to update this report".to_string()));
        }
        report.status.ensure_owner_mutable()?;

        let patch = ReportPatch {
            title: draft.title.as_deref().map(|t| required_text("title", t)).transpose()?,
            description: draft
                .description
                .as_deref()
                .map(|d| required_text("description", d))
                .transpose()?,
            category: draft.category.as_deref().map(parse_category).transpose()?,
            urgency: draft
                .urgency
                .as_deref()
                .map(|u| required_text("urgency", u))
                .transpose()?,
        };

        self.store
            .update_pending_report(id, patch)
            .await?
            .ok_or_else(|| ServiceError::Conflict(already_reviewed_message()))
    }

    /// Owner delete, allowed only while Pending. Removes the attachment too.
    pub async fn delete(&self, owner: &User, id: Uuid) -> ServiceResult<()> {
        let report = self.load(id).await?;
        if report.user_id != owner.id {
            return Err(ServiceError::Forbidden("Not authorized to delete this report".to_string()));
        }
        report.status.ensure_owner_mutable()?;

        if !self.store.delete_pending_report(id).await? {
            return Err(ServiceError::Conflict(already_reviewed_message()));
        }
        info!("Report {} deleted by owner {}", id, owner.id);

        if let Some(attachment) = report.attachment {
            self.release_attachment(&attachment).await;
        }
        Ok(())
    }

    /// Locators are content addressed, so another report may share the file
    async fn release_attachment(&self, attachment: &Attachment) {
        match self.store.locator_in_use(&attachment.locator).await {
            Ok(true) => {}
            Ok(false) => {
                if let Err(e) = self.storage.delete(&attachment.locator).await {
                    warn!("Failed to delete attachment {}: {}", attachment.locator, e);
                }
            }
            Err(e) => warn!("Skipping attachment cleanup for {}: {}", attachment.locator, e),
        }
    }

    pub async fn attachment(&self, viewer: &User, id: Uuid) -> ServiceResult<(Attachment, Vec<u8>)> {
        let report = self.load(id).await?;
        if !can_view(viewer, &report) {
            return Err(ServiceError::Forbidden("Not authorized to access this file".to_string()));
        }
        let attachment = report
            .attachment
            .ok_or_else(|| ServiceError::NotFound("No attachment found for this report".to_string()))?;
        let bytes = self.storage.get(&attachment.locator).await?;
        Ok((attachment, bytes))
    }

    /// Pending -> Approved/Rejected. The write only lands while still Pending,
    /// so of two concurrent reviews the second gets a conflict.
    pub async fn review(&self, reviewer: &User, id: Uuid, status: ReportStatus) -> ServiceResult<Report> {
        let report = self.load(id).await?;
        ensure_reviewer_scope(reviewer, &report)?;
        let next = report.status.transition_to(status)?;

        let reviewed = self
            .store
            .review_report(
                id,
                Review {
                    status: next,
                    reviewer: reviewer.id,
                    at: Utc::now(),
                },
            )
            .await?
            .ok_or_else(|| ServiceError::Conflict(already_reviewed_message()))?;
        info!("Report {} marked {} by {}", id, next, reviewer.email);

        self.notifier
            .notify_quietly(
                &[reviewed.user_id],
                &format!(
                    "Your report \"{}\" has been {}.",
                    reviewed.title,
                    next.as_str().to_lowercase()
                ),
                NotificationKind::Report,
            )
            .await;
        self.notifier.broadcast_report_update(json!({
            "type": "status_changed",
            "message": format!("Report marked as {}", next),
            "reportId": reviewed.id,
            "status": next,
            "category": reviewed.category,
        }));

        Ok(reviewed)
    }

    /// Replace the reviewer summary. Status is left untouched.
    pub async fn annotate(&self, reviewer: &User, id: Uuid, input: SummaryInput) -> ServiceResult<Report> {
        let report = self.load(id).await?;
        ensure_reviewer_scope(reviewer, &report)?;

        let summary = AdminSummary {
            revenue: input.revenue.unwrap_or_default(),
            profit: input.profit.unwrap_or_default(),
            inventory_value: input.inventory_value.unwrap_or_default(),
            notes: input.notes.map(|n| n.trim().to_string()).unwrap_or_default(),
            updated_by: Some(reviewer.id),
            updated_at: Some(Utc::now()),
        };
        let updated = self
            .store
            .update_summary(id, summary)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Report not found".to_string()))?;

        self.notifier
            .notify_quietly(
                &[updated.user_id],
                &format!("Your report \"{}\" was summarized by a reviewer.", updated.title),
                NotificationKind::Report,
            )
            .await;
        self.notifier.broadcast_report_update(json!({
            "type": "summary_updated",
            "message": "Report summary updated",
            "reportId": updated.id,
        }));

        Ok(updated)
    }

    async fn load(&self, id: Uuid) -> ServiceResult<Report> {
        self.store
            .find_report(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Report not found".to_string()))
    }

    async fn with_owners(&self, reports: Vec<Report>) -> ServiceResult<Vec<ReportView>> {
        let mut owners: HashMap<Uuid, Option<User>> = HashMap::new();
        let mut views = Vec::with_capacity(reports.len());
        for report in reports {
            if !owners.contains_key(&report.user_id) {
                let owner = self.store.find_user(report.user_id).await?;
                owners.insert(report.user_id, owner);
            }
            let user = owners
                .get(&report.user_id)
                .and_then(|o| o.as_ref())
                .map(User::summary);
            views.push(ReportView { report, user });
        }
        Ok(views)
    }
}

/// Owner-side edit where `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct PartialDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<String>,
}

fn parse_category(value: &str) -> ServiceResult<Category> {
    value
        .parse::<Category>()
        .map_err(|e| ServiceError::invalid("category", e))
}

fn already_reviewed_message() -> String {
    "Cannot change a report that has already been reviewed".to_string()
}

/// Owner, reviewers of the report's department, and superadmins
pub fn can_view(viewer: &User, report: &Report) -> bool {
    match viewer.role {
        Role::Superadmin => true,
        Role::Admin => {
            report.user_id == viewer.id
                || viewer.department.as_deref() == Some(report.category.as_str())
        }
        Role::User => report.user_id == viewer.id,
    }
}

/// Admins may only act on their own department; superadmins anywhere
pub fn ensure_reviewer_scope(reviewer: &User, report: &Report) -> ServiceResult<()> {
    match reviewer.role {
        Role::Superadmin => Ok(()),
        Role::Admin if reviewer.department.as_deref() == Some(report.category.as_str()) => Ok(()),
        Role::Admin => Err(ServiceError::Forbidden(
            "You cannot modify reports outside your department".to_string(),
        )),
        Role::User => Err(ServiceError::Forbidden("Reviewer role required".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::memory::MemoryStore;
    use crate::database::models::NewUser;
    use crate::database::store::NotificationStore;
    use crate::services::UserService;
    use crate::storage::{AttachmentPolicy, LocalDiskStorage};

    fn state() -> AppState {
        let dir = std::env::temp_dir().join(format!("report-desk-svc-{}", Uuid::new_v4()));
        let storage = LocalDiskStorage::new(
            dir,
            AttachmentPolicy {
                max_bytes: 1024,
                allowed_extensions: vec!["txt".to_string()],
            },
        );
        AppState::new(
            AppConfig::development(),
            Arc::new(MemoryStore::new()),
            Arc::new(storage),
        )
    }

    async fn user(state: &AppState, email: &str, role: Role, department: Option<&str>) -> User {
        state
            .store
            .create_user(NewUser {
                name: email.to_string(),
                email: email.to_string(),
                password_hash: "x".to_string(),
                role,
                department: department.map(str::to_string),
            })
            .await
            .unwrap()
    }

    fn draft(category: &str) -> ReportDraft {
        ReportDraft {
            title: "Q3 numbers".to_string(),
            description: "details".to_string(),
            category: category.to_string(),
            urgency: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_urgency_and_notifies_department() {
        let state = state();
        let service = ReportService::new(&state);
        let author = user(&state, "author@example.com", Role::User, None).await;
        let finance = user(&state, "fin@example.com", Role::Admin, Some("Finance Report")).await;
        let sales = user(&state, "sales@example.com", Role::Admin, Some("Sales Report")).await;
        let boss = user(&state, "boss@example.com", Role::Superadmin, None).await;

        let report = service.create(&author, draft("Finance Report"), None).await.unwrap();
        assert_eq!(report.urgency, "Normal");
        assert_eq!(report.status, ReportStatus::Pending);

        assert_eq!(state.store.list_notifications(finance.id).await.unwrap().len(), 1);
        assert_eq!(state.store.list_notifications(boss.id).await.unwrap().len(), 1);
        assert!(state.store.list_notifications(sales.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_outside_department_cannot_review() {
        let state = state();
        let service = ReportService::new(&state);
        let author = user(&state, "author@example.com", Role::User, None).await;
        let sales = user(&state, "sales@example.com", Role::Admin, Some("Sales Report")).await;
        let report = service.create(&author, draft("Finance Report"), None).await.unwrap();

        let err = service
            .review(&sales, report.id, ReportStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn review_is_one_way() {
        let state = state();
        let service = ReportService::new(&state);
        let author = user(&state, "author@example.com", Role::User, None).await;
        let boss = user(&state, "boss@example.com", Role::Superadmin, None).await;
        let report = service.create(&author, draft("Sales Report"), None).await.unwrap();

        let reviewed = service.review(&boss, report.id, ReportStatus::Rejected).await.unwrap();
        assert_eq!(reviewed.reviewed_by, Some(boss.id));
        assert!(reviewed.reviewed_at.is_some());

        assert!(matches!(
            service.review(&boss, report.id, ReportStatus::Approved).await,
            Err(ServiceError::Transition(_))
        ));
        assert!(matches!(
            service.delete(&author, report.id).await,
            Err(ServiceError::Transition(_))
        ));
    }

    #[tokio::test]
    async fn annotate_keeps_status() {
        let state = state();
        let service = ReportService::new(&state);
        let author = user(&state, "author@example.com", Role::User, None).await;
        let admin = user(&state, "inv@example.com", Role::Admin, Some("Inventory Report")).await;
        let report = service.create(&author, draft("Inventory Report"), None).await.unwrap();

        let updated = service
            .annotate(
                &admin,
                report.id,
                SummaryInput {
                    revenue: Some(Decimal::new(125050, 2)),
                    notes: Some(" restock ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, ReportStatus::Pending);
        assert_eq!(updated.admin_summary.revenue, Decimal::new(125050, 2));
        assert_eq!(updated.admin_summary.profit, Decimal::ZERO);
        assert_eq!(updated.admin_summary.notes, "restock");
        assert_eq!(updated.admin_summary.updated_by, Some(admin.id));
    }

    #[tokio::test]
    async fn attachment_round_trip_and_cleanup() {
        let state = state();
        let service = ReportService::new(&state);
        let author = user(&state, "author@example.com", Role::User, None).await;
        let upload = Upload {
            bytes: b"numbers".to_vec(),
            meta: AttachmentMeta {
                file_name: "q3.txt".to_string(),
                mime_type: None,
            },
        };
        let report = service
            .create(&author, draft("Finance Report"), Some(upload))
            .await
            .unwrap();
        let locator = report.attachment.clone().unwrap().locator;

        let (attachment, bytes) = service.attachment(&author, report.id).await.unwrap();
        assert_eq!(attachment.file_name, "q3.txt");
        assert_eq!(bytes, b"numbers");

        service.delete(&author, report.id).await.unwrap();
        assert!(state.storage.get(&locator).await.is_err());
    }

    #[tokio::test]
    async fn shared_attachment_survives_one_delete() {
        let state = state();
        let service = ReportService::new(&state);
        let author = user(&state, "author@example.com", Role::User, None).await;
        let upload = || Upload {
            bytes: b"same bytes".to_vec(),
            meta: AttachmentMeta {
                file_name: "copy.txt".to_string(),
                mime_type: None,
            },
        };
        let first = service
            .create(&author, draft("Sales Report"), Some(upload()))
            .await
            .unwrap();
        let second = service
            .create(&author, draft("Sales Report"), Some(upload()))
            .await
            .unwrap();
        let locator = first.attachment.clone().unwrap().locator;
        assert_eq!(second.attachment.unwrap().locator, locator);

        service.delete(&author, first.id).await.unwrap();
        assert_eq!(state.storage.get(&locator).await.unwrap(), b"same bytes");
    }

    #[tokio::test]
    async fn failed_insert_removes_stored_attachment() {
        let state = state();
        let service = ReportService::new(&state);
        let author = user(&state, "author@example.com", Role::User, None).await;
        let boss = user(&state, "boss@example.com", Role::Superadmin, None).await;
        UserService::new(&state).delete_user(&boss, author.id).await.unwrap();

        let upload = Upload {
            bytes: b"never filed".to_vec(),
            meta: AttachmentMeta {
                file_name: "late.txt".to_string(),
                mime_type: None,
            },
        };
        let locator = state
            .storage
            .put(&upload.bytes, upload.meta.clone())
            .await
            .unwrap()
            .locator;
        state.storage.delete(&locator).await.unwrap();

        let err = service
            .create(&author, draft("Finance Report"), Some(upload))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
        assert!(state.storage.get(&locator).await.is_err());
    }

    #[tokio::test]
    async fn concurrent_reviews_have_one_winner() {
        let state = state();
        let service = ReportService::new(&state);
        let author = user(&state, "author@example.com", Role::User, None).await;
        let boss = user(&state, "boss@example.com", Role::Superadmin, None).await;
        let finance = user(&state, "fin@example.com", Role::Admin, Some("Finance Report")).await;
        let report = service.create(&author, draft("Finance Report"), None).await.unwrap();

        let (approve, reject) = tokio::join!(
            service.review(&boss, report.id, ReportStatus::Approved),
            service.review(&finance, report.id, ReportStatus::Rejected),
        );
        let winners = [approve.is_ok(), reject.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(winners, 1);

        let loser = if let Err(e) = approve { e } else { reject.unwrap_err() };
        assert!(matches!(
            loser,
            ServiceError::Conflict(_) | ServiceError::Transition(_)
        ));

        let stored = state.store.find_report(report.id).await.unwrap().unwrap();
        assert!(!stored.status.is_pending());
        assert_eq!(state.store.list_notifications(author.id).await.unwrap().len(), 1);
    }
}
