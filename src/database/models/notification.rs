use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::user::{Role, UserSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Report,
    Promotion,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Report => "report",
            NotificationKind::Promotion => "promotion",
            NotificationKind::System => "system",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(NotificationKind::Info),
            "report" => Ok(NotificationKind::Report),
            "promotion" => Ok(NotificationKind::Promotion),
            "system" => Ok(NotificationKind::System),
            other => Err(format!("unknown notification kind '{}'", other)),
        }
    }
}

/// Entry in one user's notification list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Result of a mark-as-read call. `changed` is false when it was already read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOutcome {
    pub notification: Notification,
    pub changed: bool,
}

/// Admin view of a notification together with its recipient
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientNotification {
    #[serde(flatten)]
    pub notification: Notification,
    pub recipient: UserSummary,
}

/// Which users a system-wide notification is delivered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    All,
    User,
    Admin,
    Superadmin,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::All => "all",
            Target::User => "user",
            Target::Admin => "admin",
            Target::Superadmin => "superadmin",
        }
    }

    pub fn roles(&self) -> &'static [Role] {
        match self {
            Target::All => Role::ALL,
            Target::User => &[Role::User],
            Target::Admin => &[Role::Admin],
            Target::Superadmin => Role::SUPERADMIN_ONLY,
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Target::All),
            "user" => Ok(Target::User),
            "admin" => Ok(Target::Admin),
            "superadmin" => Ok(Target::Superadmin),
            other => Err(format!("unknown target '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemNotification {
    pub id: Uuid,
    pub message: String,
    pub target: Target,
    pub sent_by: Uuid,
    pub recipients: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_all_covers_every_role() {
        assert_eq!(Target::All.roles(), Role::ALL);
        assert_eq!(Target::Admin.roles(), &[Role::Admin]);
        assert_eq!("superadmin".parse::<Target>().unwrap(), Target::Superadmin);
        assert!("everyone".parse::<Target>().is_err());
    }
}
