use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::models::{
    AdminRequest, AdminSummary, Attachment, NewReport, NewStat, NewUser, Notification,
    NotificationKind, ReadOutcome, RecipientNotification, Report, ReportFilter, ReportPatch,
    ReportScope, ReportStatus, Review, Role, Stat, SystemNotification, Target, User, UserSummary,
};
use crate::database::store::{
    NotificationStore, ReportStore, RoleChange, StatStore, Store, StoreError, StoreResult,
    UserStore,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, department, admin_request, \
    requested_department, created_at, updated_at";

const REPORT_COLUMNS: &str = "id, title, description, category, urgency, user_id, status, \
    attachment_locator, attachment_name, attachment_mime, attachment_size, reviewed_by, reviewed_at, \
    summary_revenue, summary_profit, summary_inventory_value, summary_notes, summary_updated_by, \
    summary_updated_at, created_at, updated_at";

const NOTIFICATION_COLUMNS: &str = "id, user_id, message, kind, read, read_at, created_at";

/// Postgres-backed store. All queries are built at runtime.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn parse_column<T>(row: &PgRow, column: &str) -> StoreResult<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|e: String| StoreError::CorruptRow(format!("{}: {}", column, e)))
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: parse_column::<Role>(row, "role")?,
        department: row.try_get("department")?,
        admin_request: parse_column::<AdminRequest>(row, "admin_request")?,
        requested_department: row.try_get("requested_department")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn report_from_row(row: &PgRow) -> StoreResult<Report> {
    let locator: Option<String> = row.try_get("attachment_locator")?;
    let attachment = match locator {
        Some(locator) => Some(Attachment {
            locator,
            file_name: row.try_get::<Option<String>, _>("attachment_name")?.unwrap_or_default(),
            mime_type: row.try_get::<Option<String>, _>("attachment_mime")?.unwrap_or_default(),
            size: row.try_get::<Option<i64>, _>("attachment_size")?.unwrap_or(0),
        }),
        None => None,
    };

    Ok(Report {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: parse_column(row, "category")?,
        urgency: row.try_get("urgency")?,
        user_id: row.try_get("user_id")?,
        status: parse_column(row, "status")?,
        attachment,
        reviewed_by: row.try_get("reviewed_by")?,
        reviewed_at: row.try_get("reviewed_at")?,
        admin_summary: AdminSummary {
            revenue: row.try_get("summary_revenue")?,
            profit: row.try_get("summary_profit")?,
            inventory_value: row.try_get("summary_inventory_value")?,
            notes: row.try_get("summary_notes")?,
            updated_by: row.try_get("summary_updated_by")?,
            updated_at: row.try_get("summary_updated_at")?,
        },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn notification_from_row(row: &PgRow) -> StoreResult<Notification> {
    Ok(Notification {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        message: row.try_get("message")?,
        kind: parse_column::<NotificationKind>(row, "kind")?,
        read: row.try_get("read")?,
        read_at: row.try_get("read_at")?,
        created_at: row.try_get("created_at")?,
    })
}

fn system_notification_from_row(row: &PgRow) -> StoreResult<SystemNotification> {
    Ok(SystemNotification {
        id: row.try_get("id")?,
        message: row.try_get("message")?,
        target: parse_column::<Target>(row, "target")?,
        sent_by: row.try_get("sent_by")?,
        recipients: row.try_get("recipients")?,
        created_at: row.try_get("created_at")?,
    })
}

fn stat_from_row(row: &PgRow) -> StoreResult<Stat> {
    Ok(Stat {
        id: row.try_get("id")?,
        total_revenue: row.try_get("total_revenue")?,
        total_profit: row.try_get("total_profit")?,
        total_inventory: row.try_get("total_inventory")?,
        submitted_by: row.try_get("submitted_by")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_rows<T>(rows: &[PgRow], f: fn(&PgRow) -> StoreResult<T>) -> StoreResult<Vec<T>> {
    rows.iter().map(f).collect()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let email = new_user.email.to_lowercase();
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash, role, department) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_user.name)
            .bind(&email)
            .bind(&new_user.password_hash)
            .bind(new_user.role.as_str())
            .bind(&new_user.department)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Conflict(format!("email '{}' is already registered", email))
                } else {
                    StoreError::from(e)
                }
            })?;
        user_from_row(&row)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        map_rows(&rows, user_from_row)
    }

    async fn users_with_roles(&self, roles: &[Role]) -> StoreResult<Vec<User>> {
        let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
        let sql = format!("SELECT {} FROM users WHERE role = ANY($1)", USER_COLUMNS);
        let rows = sqlx::query(&sql).bind(&names).fetch_all(&self.pool).await?;
        map_rows(&rows, user_from_row)
    }

    async fn count_users_by_role(&self) -> StoreResult<HashMap<Role, i64>> {
        let rows = sqlx::query("SELECT role, COUNT(*) AS total FROM users GROUP BY role")
            .fetch_all(&self.pool)
            .await?;
        let mut counts = HashMap::new();
        for row in &rows {
            counts.insert(parse_column::<Role>(row, "role")?, row.try_get("total")?);
        }
        Ok(counts)
    }

    async fn update_user_role(
        &self,
        id: Uuid,
        role: Role,
        department: Option<String>,
    ) -> StoreResult<RoleChange> {
        let mut tx = self.pool.begin().await?;

        // Locking every superadmin row serializes concurrent demotions; a waiter
        // re-reads the rows after the first commit and sees the lower count.
        let superadmins: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE role = 'superadmin' FOR UPDATE")
                .fetch_all(&mut *tx)
                .await?;
        let current: Option<String> =
            sqlx::query_scalar("SELECT role FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(current) = current else {
            return Ok(RoleChange::NotFound);
        };
        let previous = current
            .parse::<Role>()
            .map_err(|e| StoreError::CorruptRow(format!("role: {}", e)))?;
        if previous == Role::Superadmin && role != Role::Superadmin && superadmins.len() <= 1 {
            return Ok(RoleChange::LastSuperadmin);
        }

        let sql = format!(
            "UPDATE users SET role = $2, department = COALESCE($3, department), \
             admin_request = CASE WHEN $2 = 'user' THEN admin_request ELSE 'none' END, \
             requested_department = CASE WHEN $2 = 'user' THEN requested_department ELSE NULL END, \
             updated_at = now() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(role.as_str())
            .bind(department)
            .fetch_one(&mut *tx)
            .await?;
        let user = user_from_row(&row)?;
        tx.commit().await?;
        Ok(RoleChange::Updated { previous, user })
    }

    async fn open_admin_request(
        &self,
        id: Uuid,
        department: Option<String>,
    ) -> StoreResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET admin_request = 'pending', requested_department = $2, updated_at = now() \
             WHERE id = $1 AND role = 'user' AND admin_request <> 'pending' RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(department)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn resolve_admin_request(
        &self,
        id: Uuid,
        approve: bool,
        department: Option<String>,
    ) -> StoreResult<Option<User>> {
        let row = if approve {
            let sql = format!(
                "UPDATE users SET role = 'admin', department = COALESCE($2, requested_department), \
                 admin_request = 'none', requested_department = NULL, updated_at = now() \
                 WHERE id = $1 AND admin_request = 'pending' AND role = 'user' RETURNING {}",
                USER_COLUMNS
            );
            sqlx::query(&sql)
                .bind(id)
                .bind(department)
                .fetch_optional(&self.pool)
                .await?
        } else {
            let sql = format!(
                "UPDATE users SET admin_request = 'rejected', requested_department = NULL, \
                 updated_at = now() WHERE id = $1 AND admin_request = 'pending' AND role = 'user' \
                 RETURNING {}",
                USER_COLUMNS
            );
            sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?
        };
        row.as_ref().map(user_from_row).transpose()
    }

    async fn pending_admin_requests(&self) -> StoreResult<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE admin_request = 'pending' ORDER BY updated_at DESC",
            USER_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        map_rows(&rows, user_from_row)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReportStore for PgStore {
    async fn insert_report(&self, new_report: NewReport) -> StoreResult<Report> {
        let sql = format!(
            "INSERT INTO reports (id, title, description, category, urgency, user_id, \
             attachment_locator, attachment_name, attachment_mime, attachment_size) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            REPORT_COLUMNS
        );
        let attachment = new_report.attachment.as_ref();
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_report.title)
            .bind(&new_report.description)
            .bind(new_report.category.as_str())
            .bind(&new_report.urgency)
            .bind(new_report.user_id)
            .bind(attachment.map(|a| a.locator.clone()))
            .bind(attachment.map(|a| a.file_name.clone()))
            .bind(attachment.map(|a| a.mime_type.clone()))
            .bind(attachment.map(|a| a.size))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    StoreError::NotFound(format!("user {} not found", new_report.user_id))
                } else {
                    StoreError::from(e)
                }
            })?;
        report_from_row(&row)
    }

    async fn find_report(&self, id: Uuid) -> StoreResult<Option<Report>> {
        let sql = format!("SELECT {} FROM reports WHERE id = $1", REPORT_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(report_from_row).transpose()
    }

    async fn list_reports(&self, scope: &ReportScope, filter: &ReportFilter) -> StoreResult<Vec<Report>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM reports WHERE TRUE", REPORT_COLUMNS));

        match scope {
            ReportScope::All => {}
            ReportScope::Owner(owner) => {
                builder.push(" AND user_id = ").push_bind(*owner);
            }
            ReportScope::Department(department) => {
                builder.push(" AND category = ").push_bind(department.clone());
            }
            ReportScope::DepartmentOrOwner { department, owner } => {
                builder
                    .push(" AND (category = ")
                    .push_bind(department.clone())
                    .push(" OR user_id = ")
                    .push_bind(*owner)
                    .push(")");
            }
        }
        if let Some(category) = filter.category {
            builder.push(" AND category = ").push_bind(category.as_str());
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        builder.push(" ORDER BY created_at DESC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        map_rows(&rows, report_from_row)
    }

    async fn update_pending_report(&self, id: Uuid, patch: ReportPatch) -> StoreResult<Option<Report>> {
        let sql = format!(
            "UPDATE reports SET title = COALESCE($2, title), description = COALESCE($3, description), \
             category = COALESCE($4, category), urgency = COALESCE($5, urgency), updated_at = now() \
             WHERE id = $1 AND status = 'Pending' RETURNING {}",
            REPORT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.description)
            .bind(patch.category.map(|c| c.as_str()))
            .bind(patch.urgency)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(report_from_row).transpose()
    }

    async fn review_report(&self, id: Uuid, review: Review) -> StoreResult<Option<Report>> {
        let sql = format!(
            "UPDATE reports SET status = $2, reviewed_by = $3, reviewed_at = $4, updated_at = $4 \
             WHERE id = $1 AND status = 'Pending' RETURNING {}",
            REPORT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(review.status.as_str())
            .bind(review.reviewer)
            .bind(review.at)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(report_from_row).transpose()
    }

    async fn update_summary(&self, id: Uuid, summary: AdminSummary) -> StoreResult<Option<Report>> {
        let sql = format!(
            "UPDATE reports SET summary_revenue = $2, summary_profit = $3, summary_inventory_value = $4, \
             summary_notes = $5, summary_updated_by = $6, summary_updated_at = $7, updated_at = now() \
             WHERE id = $1 RETURNING {}",
            REPORT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(summary.revenue)
            .bind(summary.profit)
            .bind(summary.inventory_value)
            .bind(&summary.notes)
            .bind(summary.updated_by)
            .bind(summary.updated_at)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(report_from_row).transpose()
    }

    async fn delete_pending_report(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1 AND status = 'Pending'")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn report_status_counts(&self) -> StoreResult<HashMap<ReportStatus, i64>> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS total FROM reports GROUP BY status")
            .fetch_all(&self.pool)
            .await?;
        let mut counts = HashMap::new();
        for row in &rows {
            counts.insert(parse_column::<ReportStatus>(row, "status")?, row.try_get("total")?);
        }
        Ok(counts)
    }

    async fn locator_in_use(&self, locator: &str) -> StoreResult<bool> {
        let in_use: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM reports WHERE attachment_locator = $1)")
                .bind(locator)
                .fetch_one(&self.pool)
                .await?;
        Ok(in_use)
    }
}

#[async_trait]
impl NotificationStore for PgStore {
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
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = user_ids.iter().map(|_| Uuid::new_v4()).collect();
        let sql = format!(
            "INSERT INTO user_notifications (id, user_id, message, kind) \
             SELECT batch.id, batch.user_id, $3, $4 \
             FROM UNNEST($1::uuid[], $2::uuid[]) AS batch(id, user_id) \
             JOIN users ON users.id = batch.user_id \
             RETURNING {}",
            NOTIFICATION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(&ids)
            .bind(user_ids)
            .bind(message)
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await?;
        map_rows(&rows, notification_from_row)
    }

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let sql = format!(
            "SELECT {} FROM user_notifications WHERE user_id = $1 ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;
        map_rows(&rows, notification_from_row)
    }

    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<ReadOutcome>> {
        let update = format!(
            "UPDATE user_notifications SET read = true, read_at = $3 \
             WHERE id = $1 AND user_id = $2 AND read = false RETURNING {}",
            NOTIFICATION_COLUMNS
        );
        let updated = sqlx::query(&update)
            .bind(notification_id)
            .bind(user_id)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(row) = updated {
            return Ok(Some(ReadOutcome {
                notification: notification_from_row(&row)?,
                changed: true,
            }));
        }

        let select = format!(
            "SELECT {} FROM user_notifications WHERE id = $1 AND user_id = $2",
            NOTIFICATION_COLUMNS
        );
        let existing = sqlx::query(&select)
            .bind(notification_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        existing
            .as_ref()
            .map(|row| {
                Ok(ReadOutcome {
                    notification: notification_from_row(row)?,
                    changed: false,
                })
            })
            .transpose()
    }

    async fn clear_notifications(&self, user_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM user_notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_all_notifications(&self) -> StoreResult<Vec<RecipientNotification>> {
        let rows = sqlx::query(
            "SELECT n.id, n.user_id, n.message, n.kind, n.read, n.read_at, n.created_at, \
             u.name AS recipient_name, u.email AS recipient_email, u.role AS recipient_role \
             FROM user_notifications n JOIN users u ON u.id = n.user_id \
             ORDER BY n.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let notification = notification_from_row(row)?;
                Ok(RecipientNotification {
                    recipient: UserSummary {
                        id: notification.user_id,
                        name: row.try_get("recipient_name")?,
                        email: row.try_get("recipient_email")?,
                        role: parse_column(row, "recipient_role")?,
                    },
                    notification,
                })
            })
            .collect()
    }

    async fn insert_system_notification(
        &self,
        message: &str,
        target: Target,
        sent_by: Uuid,
        recipients: i64,
    ) -> StoreResult<SystemNotification> {
        let row = sqlx::query(
            "INSERT INTO system_notifications (id, message, target, sent_by, recipients) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, message, target, sent_by, recipients, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(message)
        .bind(target.as_str())
        .bind(sent_by)
        .bind(recipients)
        .fetch_one(&self.pool)
        .await?;
        system_notification_from_row(&row)
    }

    async fn list_system_notifications(&self) -> StoreResult<Vec<SystemNotification>> {
        let rows = sqlx::query(
            "SELECT id, message, target, sent_by, recipients, created_at \
             FROM system_notifications ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        map_rows(&rows, system_notification_from_row)
    }
}

#[async_trait]
impl StatStore for PgStore {
    async fn insert_stat(&self, new_stat: NewStat) -> StoreResult<Stat> {
        let row = sqlx::query(
            "INSERT INTO stats (id, total_revenue, total_profit, total_inventory, submitted_by) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, total_revenue, total_profit, total_inventory, submitted_by, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new_stat.total_revenue)
        .bind(new_stat.total_profit)
        .bind(new_stat.total_inventory)
        .bind(new_stat.submitted_by)
        .fetch_one(&self.pool)
        .await?;
        stat_from_row(&row)
    }

    async fn list_stats(&self) -> StoreResult<Vec<Stat>> {
        let rows = sqlx::query(
            "SELECT id, total_revenue, total_profit, total_inventory, submitted_by, created_at \
             FROM stats ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        map_rows(&rows, stat_from_row)
    }

    async fn latest_stat(&self) -> StoreResult<Option<Stat>> {
        let row = sqlx::query(
            "SELECT id, total_revenue, total_profit, total_inventory, submitted_by, created_at \
             FROM stats ORDER BY created_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(stat_from_row).transpose()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
