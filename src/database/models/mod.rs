pub mod notification;
pub mod report;
pub mod stat;
pub mod user;

pub use notification::{
    Notification, NotificationKind, ReadOutcome, RecipientNotification, SystemNotification, Target,
};
pub use report::{
    AdminSummary, Attachment, Category, NewReport, Report, ReportFilter, ReportPatch, ReportScope,
    ReportStatus, ReportView, Review, TransitionError,
};
pub use stat::{NewStat, Stat};
pub use user::{AdminRequest, NewUser, Role, User, UserSummary};
