use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::user::UserSummary;

/// Report categories. An admin's department holds one of these labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Finance Report")]
    Finance,
    #[serde(rename = "Sales Report")]
    Sales,
    #[serde(rename = "Inventory Report")]
    Inventory,
    #[serde(rename = "Resources Report")]
    Resources,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::Finance,
        Category::Sales,
        Category::Inventory,
        Category::Resources,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Finance => "Finance Report",
            Category::Sales => "Sales Report",
            Category::Inventory => "Inventory Report",
            Category::Resources => "Resources Report",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Review lifecycle. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("report has already been reviewed ({0})")]
    AlreadyReviewed(ReportStatus),
    #[error("reports cannot be moved back to Pending")]
    NotAReviewOutcome,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::Approved => "Approved",
            ReportStatus::Rejected => "Rejected",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ReportStatus::Pending)
    }

    /// Validate a review transition from `self` to `next`.
    pub fn transition_to(self, next: ReportStatus) -> Result<ReportStatus, TransitionError> {
        match (self, next) {
            (_, ReportStatus::Pending) => Err(TransitionError::NotAReviewOutcome),
            (ReportStatus::Pending, outcome) => Ok(outcome),
            (reviewed, _) => Err(TransitionError::AlreadyReviewed(reviewed)),
        }
    }

    /// Owners may only touch a report that nobody has reviewed yet.
    pub fn ensure_owner_mutable(self) -> Result<(), TransitionError> {
        if self.is_pending() {
            Ok(())
        } else {
            Err(TransitionError::AlreadyReviewed(self))
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pending" | "pending" => Ok(ReportStatus::Pending),
            "Approved" | "approved" => Ok(ReportStatus::Approved),
            "Rejected" | "rejected" => Ok(ReportStatus::Rejected),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub locator: String,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub revenue: Decimal,
    pub profit: Decimal,
    pub inventory_value: Decimal,
    pub notes: String,
    pub updated_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub urgency: String,
    pub user_id: Uuid,
    pub status: ReportStatus,
    pub attachment: Option<Attachment>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_summary: AdminSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Report with its owner resolved, as returned by listing endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    #[serde(flatten)]
    pub report: Report,
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub urgency: String,
    pub user_id: Uuid,
    pub attachment: Option<Attachment>,
}

/// Owner edits. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ReportPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub urgency: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Review {
    pub status: ReportStatus,
    pub reviewer: Uuid,
    pub at: DateTime<Utc>,
}

/// Visibility scope applied to report listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportScope {
    All,
    Owner(Uuid),
    Department(String),
    DepartmentOrOwner { department: String, owner: Uuid },
}

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub category: Option<Category>,
    pub status: Option<ReportStatus>,
}

impl ReportScope {
    pub fn admits(&self, report: &Report) -> bool {
        match self {
            ReportScope::All => true,
            ReportScope::Owner(owner) => report.user_id == *owner,
            ReportScope::Department(department) => report.category.as_str() == department,
            ReportScope::DepartmentOrOwner { department, owner } => {
                report.category.as_str() == department || report.user_id == *owner
            }
        }
    }
}

impl ReportFilter {
    pub fn admits(&self, report: &Report) -> bool {
        self.category.map_or(true, |c| report.category == c)
            && self.status.map_or(true, |s| report.status == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_to_either_outcome() {
        assert_eq!(
            ReportStatus::Pending.transition_to(ReportStatus::Approved),
            Ok(ReportStatus::Approved)
        );
        assert_eq!(
            ReportStatus::Pending.transition_to(ReportStatus::Rejected),
            Ok(ReportStatus::Rejected)
        );
    }

    #[test]
    fn reviewed_reports_are_terminal() {
        assert_eq!(
            ReportStatus::Approved.transition_to(ReportStatus::Rejected),
            Err(TransitionError::AlreadyReviewed(ReportStatus::Approved))
        );
        assert_eq!(
            ReportStatus::Rejected.transition_to(ReportStatus::Approved),
            Err(TransitionError::AlreadyReviewed(ReportStatus::Rejected))
        );
        assert_eq!(
            ReportStatus::Approved.transition_to(ReportStatus::Pending),
            Err(TransitionError::NotAReviewOutcome)
        );
        assert!(ReportStatus::Rejected.ensure_owner_mutable().is_err());
        assert!(ReportStatus::Pending.ensure_owner_mutable().is_ok());
    }

    #[test]
    fn category_labels_match_wire_format() {
        assert_eq!("Finance Report".parse::<Category>().unwrap(), Category::Finance);
        assert_eq!(
            serde_json::to_value(Category::Inventory).unwrap(),
            serde_json::json!("Inventory Report")
        );
        assert!("Finance".parse::<Category>().is_err());
    }

    #[test]
    fn department_scope_matches_category_label() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let report = Report {
            id: Uuid::new_v4(),
            title: "Q3".to_string(),
            description: "numbers".to_string(),
            category: Category::Sales,
            urgency: "Normal".to_string(),
            user_id: owner,
            status: ReportStatus::Pending,
            attachment: None,
            reviewed_by: None,
            reviewed_at: None,
            admin_summary: AdminSummary::default(),
            created_at: now,
            updated_at: now,
        };

        assert!(ReportScope::Department("Sales Report".to_string()).admits(&report));
        assert!(!ReportScope::Department("Finance Report".to_string()).admits(&report));
        assert!(ReportScope::DepartmentOrOwner {
            department: "Finance Report".to_string(),
            owner,
        }
        .admits(&report));
        assert!(!ReportScope::Owner(Uuid::new_v4()).admits(&report));
    }
}
