use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{required_text, ServiceError, ServiceResult};
use crate::database::models::{
    Notification, NotificationKind, ReadOutcome, RecipientNotification, Role, SystemNotification,
    Target,
};
use crate::database::store::{NotificationStore, Store, UserStore};
use crate::realtime::{Audience, EventName, Hub};
use crate::state::AppState;

/// Outcome of a system-wide send
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemDelivery {
    pub notification: SystemNotification,
    pub live_sessions: usize,
}

/// Stored per-user notifications plus live socket delivery
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn Store>,
    hub: Hub,
}

impl NotificationService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            hub: state.hub.clone(),
        }
    }

    /// Append to one user's list and push it to their live sessions
    pub async fn notify(
        &self,
        user_id: Uuid,
        message: &str,
        kind: NotificationKind,
    ) -> ServiceResult<Notification> {
        let notification = self.store.push_notification(user_id, message, kind).await?;
        self.deliver(&notification);
        Ok(notification)
    }

    /// One bulk write for every recipient, then one live frame each
    pub async fn notify_many(
        &self,
        user_ids: &[Uuid],
        message: &str,
        kind: NotificationKind,
    ) -> ServiceResult<Vec<Notification>> {
        let created = self.store.push_notifications(user_ids, message, kind).await?;
        for notification in &created {
            self.deliver(notification);
        }
        Ok(created)
    }

    pub async fn notify_roles(
        &self,
        roles: &[Role],
        message: &str,
        kind: NotificationKind,
    ) -> ServiceResult<Vec<Notification>> {
        let ids: Vec<Uuid> = self
            .store
            .users_with_roles(roles)
            .await?
            .iter()
            .map(|u| u.id)
            .collect();
        self.notify_many(&ids, message, kind).await
    }

    /// Fanout that must not fail the request that triggered it
    pub async fn notify_quietly(&self, user_ids: &[Uuid], message: &str, kind: NotificationKind) {
        if let Err(e) = self.notify_many(user_ids, message, kind).await {
            warn!("Failed to deliver notification '{}': {}", message, e);
        }
    }

    /// `reportUpdated` event for every connected client
    pub fn broadcast_report_update(&self, data: Value) {
        self.hub.publish(Audience::Everyone, EventName::ReportUpdated, data);
    }

    fn deliver(&self, notification: &Notification) {
        match serde_json::to_value(notification) {
            Ok(data) => {
                self.hub
                    .publish(Audience::User(notification.user_id), EventName::Notification, data);
            }
            Err(e) => warn!("Failed to serialize notification {}: {}", notification.id, e),
        }
    }

    pub async fn list(&self, user_id: Uuid) -> ServiceResult<Vec<Notification>> {
        Ok(self.store.list_notifications(user_id).await?)
    }

    /// Idempotent: a second call reports `changed: false` and keeps the first `readAt`
    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> ServiceResult<ReadOutcome> {
        self.store
            .mark_notification_read(user_id, notification_id, Utc::now())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Notification not found".to_string()))
    }

    pub async fn clear(&self, user_id: Uuid) -> ServiceResult<u64> {
        let removed = self.store.clear_notifications(user_id).await?;
        info!("Cleared {} notifications for user {}", removed, user_id);
        Ok(removed)
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<RecipientNotification>> {
        Ok(self.store.list_all_notifications().await?)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> ServiceResult<Vec<RecipientNotification>> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        let recipient = user.summary();
        Ok(self
            .store
            .list_notifications(user_id)
            .await?
            .into_iter()
            .map(|notification| RecipientNotification {
                notification,
                recipient: recipient.clone(),
            })
            .collect())
    }

    /// Direct message to one user
    pub async fn send_to_user(
        &self,
        user_id: Uuid,
        message: &str,
        kind: NotificationKind,
    ) -> ServiceResult<Notification> {
        let message = required_text("message", message)?;
        if self.store.find_user(user_id).await?.is_none() {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }
        self.notify(user_id, &message, kind).await
    }

    /// Fan one message out to every user matching `target` and record it
    pub async fn send_system(
        &self,
        sender: Uuid,
        message: &str,
        target: Target,
    ) -> ServiceResult<SystemDelivery> {
        let message = required_text("message", message)?;
        let recipients: Vec<Uuid> = self
            .store
            .users_with_roles(target.roles())
            .await?
            .iter()
            .map(|u| u.id)
            .collect();

        let created = self
            .store
            .push_notifications(&recipients, &message, NotificationKind::System)
            .await?;
        let record = self
            .store
            .insert_system_notification(&message, target, sender, created.len() as i64)
            .await?;

        let live_sessions = self.hub.publish(
            Audience::Roles(target.roles().to_vec()),
            EventName::Notification,
            json!({
                "id": record.id,
                "message": record.message,
                "kind": NotificationKind::System,
                "target": target,
                "createdAt": record.created_at,
            }),
        );
        info!(
            "System notification sent to {} users (target: {})",
            record.recipients,
            target.as_str()
        );

        Ok(SystemDelivery {
            notification: record,
            live_sessions,
        })
    }

    pub async fn list_system(&self) -> ServiceResult<Vec<SystemNotification>> {
        Ok(self.store.list_system_notifications().await?)
    }
}
