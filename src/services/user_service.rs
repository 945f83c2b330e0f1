use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{parse_department, required_text, NotificationService, ServiceError, ServiceResult};
use crate::auth::{hash_password, verify_password, AuthError, JwtKeys};
use crate::database::models::{
    NewUser, NotificationKind, ReportFilter, ReportScope, Role, User,
};
use crate::database::store::{ReportStore, RoleChange, Store, UserStore};
use crate::realtime::Hub;
use crate::state::AppState;
use crate::storage::AttachmentStorage;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Successful login: a bearer token plus the account it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct LoginSession {
    pub token: String,
    pub role: Role,
    pub name: String,
    pub user: User,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    storage: Arc<dyn AttachmentStorage>,
    keys: JwtKeys,
    bcrypt_cost: u32,
    notifier: NotificationService,
    hub: Hub,
}

impl UserService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            storage: Arc::clone(&state.storage),
            keys: state.keys.clone(),
            bcrypt_cost: state.config.security.bcrypt_cost,
            notifier: NotificationService::new(state),
            hub: state.hub.clone(),
        }
    }

    pub async fn register(&self, input: RegisterInput) -> ServiceResult<User> {
        let name = required_text("name", &input.name)?;
        let email = normalize_email(&input.email)?;
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(ServiceError::invalid(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }

        let user = self
            .store
            .create_user(NewUser {
                name,
                email,
                password_hash: hash_password(&input.password, self.bcrypt_cost)?,
                role: Role::User,
                department: None,
            })
            .await?;
        info!("Registered user {} ({})", user.email, user.id);
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<LoginSession> {
        let email = email.trim().to_lowercase();
        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, &user.password_hash)? {
            warn!("Failed login for {}", email);
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.keys.issue(user.id, user.role)?;
        Ok(LoginSession {
            token,
            role: user.role,
            name: user.name.clone(),
            user,
        })
    }

    /// User asks to become an admin, optionally naming a department
    pub async fn request_admin(&self, user: &User, department: Option<&str>) -> ServiceResult<User> {
        if user.role != Role::User {
            return Err(ServiceError::Forbidden(format!(
                "Role '{}' cannot request admin access",
                user.role
            )));
        }
        let department = parse_department(department)?;

        let updated = self
            .store
            .open_admin_request(user.id, department.clone())
            .await?
            .ok_or_else(|| ServiceError::Conflict("An admin request is already pending".to_string()))?;
        info!("User {} requested admin access", updated.email);

        let message = match department.as_deref() {
            Some(department) => format!(
                "{} ({}) requested admin access for {}",
                updated.name, updated.email, department
            ),
            None => format!("{} ({}) requested admin access", updated.name, updated.email),
        };
        if let Err(e) = self
            .notifier
            .notify_roles(Role::SUPERADMIN_ONLY, &message, NotificationKind::Promotion)
            .await
        {
            warn!("Failed to notify superadmins of admin request: {}", e);
        }
        Ok(updated)
    }

    pub async fn pending_requests(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.pending_admin_requests().await?)
    }

    /// Approve or reject a pending request in one write, then tell the requester
    pub async fn handle_request(
        &self,
        user_id: Uuid,
        approve: bool,
        department: Option<&str>,
    ) -> ServiceResult<User> {
        let department = parse_department(department)?;
        if self.store.find_user(user_id).await?.is_none() {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        let resolved = self
            .store
            .resolve_admin_request(user_id, approve, department)
            .await?
            .ok_or_else(|| ServiceError::Conflict("No pending admin request for this user".to_string()))?;

        let message = if approve {
            match resolved.department.as_deref() {
                Some(department) => format!(
                    "Your admin request was approved. You now review {}.",
                    department
                ),
                None => "Your admin request was approved.".to_string(),
            }
        } else {
            "Your admin request was rejected.".to_string()
        };
        info!(
            "Admin request for {} {}",
            resolved.email,
            if approve { "approved" } else { "rejected" }
        );
        self.notifier
            .notify_quietly(&[resolved.id], &message, NotificationKind::Promotion)
            .await;
        if approve {
            self.hub.end_sessions(resolved.id);
        }
        Ok(resolved)
    }

    pub async fn list_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }

    /// Direct role change. The last superadmin can never be demoted.
    pub async fn change_role(
        &self,
        actor: &User,
        user_id: Uuid,
        role: Role,
        department: Option<&str>,
    ) -> ServiceResult<User> {
        let department = parse_department(department)?;
        let (previous, updated) = match self.store.update_user_role(user_id, role, department).await? {
            RoleChange::Updated { previous, user } => (previous, user),
            RoleChange::NotFound => return Err(ServiceError::NotFound("User not found".to_string())),
            RoleChange::LastSuperadmin => {
                return Err(ServiceError::Conflict("Cannot demote the last superadmin".to_string()))
            }
        };
        info!(
            "{} changed role of {} from {} to {}",
            actor.email, updated.email, previous, updated.role
        );

        if previous != updated.role {
            self.notifier
                .notify_quietly(
                    &[updated.id],
                    &format!("Your role has been changed to {}.", updated.role),
                    NotificationKind::Promotion,
                )
                .await;
            self.hub.end_sessions(updated.id);
        }
        Ok(updated)
    }

    /// Hard delete. Superadmin accounts are never deletable.
    pub async fn delete_user(&self, actor: &User, user_id: Uuid) -> ServiceResult<()> {
        let target = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        if target.role == Role::Superadmin {
            return Err(ServiceError::Forbidden("Superadmin accounts cannot be deleted".to_string()));
        }

        let owned = self
            .store
            .list_reports(&ReportScope::Owner(user_id), &ReportFilter::default())
            .await?;
        if !self.store.delete_user(user_id).await? {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }
        info!("{} deleted user {}", actor.email, target.email);
        self.hub.end_sessions(user_id);

        // Locators are content addressed, another user's report may share one
        for attachment in owned.into_iter().filter_map(|r| r.attachment) {
            match self.store.locator_in_use(&attachment.locator).await {
                Ok(false) => {
                    if let Err(e) = self.storage.delete(&attachment.locator).await {
                        warn!("Failed to delete attachment {}: {}", attachment.locator, e);
                    }
                }
                Ok(true) => {}
                Err(e) => warn!("Skipping attachment cleanup for {}: {}", attachment.locator, e),
            }
        }
        Ok(())
    }

    /// Create the configured superadmin unless that email is already taken
    pub async fn seed_superadmin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<Option<User>> {
        let email = normalize_email(email)?;
        if let Some(existing) = self.store.find_user_by_email(&email).await? {
            if existing.role != Role::Superadmin {
                warn!(
                    "Bootstrap account {} exists with role {}, leaving it unchanged",
                    email, existing.role
                );
            }
            return Ok(None);
        }

        let user = self
            .store
            .create_user(NewUser {
                name: required_text("name", name)?,
                email,
                password_hash: hash_password(password, self.bcrypt_cost)?,
                role: Role::Superadmin,
                department: None,
            })
            .await?;
        info!("Seeded superadmin {}", user.email);
        Ok(Some(user))
    }
}

fn normalize_email(raw: &str) -> ServiceResult<String> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(ServiceError::invalid("email", "A valid email address is required"));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::memory::MemoryStore;
    use crate::database::models::AdminRequest;
    use crate::database::store::{NotificationStore, UserStore};

    fn state() -> AppState {
        AppState::with_local_storage(AppConfig::development(), Arc::new(MemoryStore::new()))
    }

    async fn register(service: &UserService, email: &str) -> User {
        service
            .register(RegisterInput {
                name: "Someone".to_string(),
                email: email.to_string(),
                password: "secret-pass".to_string(),
            })
            .await
            .unwrap()
    }

    #[test]
    fn email_validation() {
        assert_eq!(normalize_email(" A@Example.com ").unwrap(), "a@example.com");
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("a@localhost").is_err());
    }

    #[tokio::test]
    async fn login_checks_password() {
        let state = state();
        let service = UserService::new(&state);
        let user = register(&service, "login@example.com").await;

        let session = service.login("LOGIN@example.com", "secret-pass").await.unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(state.keys.verify(&session.token).unwrap().role, Role::User);

        assert!(matches!(
            service.login("login@example.com", "wrong").await,
            Err(ServiceError::Auth(AuthError::InvalidCredentials))
        ));
        assert!(matches!(
            service.login("nobody@example.com", "secret-pass").await,
            Err(ServiceError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn promotion_round_trip() {
        let state = state();
        let service = UserService::new(&state);
        let boss = service
            .seed_superadmin("Boss", "boss@example.com", "boss-pass")
            .await
            .unwrap()
            .unwrap();
        let user = register(&service, "hopeful@example.com").await;

        let pending = service.request_admin(&user, Some("Finance Report")).await.unwrap();
        assert_eq!(pending.admin_request, AdminRequest::Pending);
        assert!(matches!(
            service.request_admin(&pending, None).await,
            Err(ServiceError::Conflict(_))
        ));
        assert_eq!(state.store.list_notifications(boss.id).await.unwrap().len(), 1);

        let promoted = service.handle_request(user.id, true, None).await.unwrap();
        assert_eq!(promoted.role, Role::Admin);
        assert_eq!(promoted.department.as_deref(), Some("Finance Report"));
        assert_eq!(promoted.admin_request, AdminRequest::None);
        assert_eq!(state.store.list_notifications(user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn last_superadmin_is_protected() {
        let state = state();
        let service = UserService::new(&state);
        let boss = service
            .seed_superadmin("Boss", "boss@example.com", "boss-pass")
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(
            service.change_role(&boss, boss.id, Role::Admin, None).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            service.delete_user(&boss, boss.id).await,
            Err(ServiceError::Forbidden(_))
        ));

        let second = register(&service, "second@example.com").await;
        service
            .change_role(&boss, second.id, Role::Superadmin, None)
            .await
            .unwrap();
        let demoted = service.change_role(&boss, boss.id, Role::Admin, None).await.unwrap();
        assert_eq!(demoted.role, Role::Admin);
    }

    #[tokio::test]
    async fn direct_promotion_closes_pending_request() {
        let state = state();
        let service = UserService::new(&state);
        let boss = service
            .seed_superadmin("Boss", "boss@example.com", "boss-pass")
            .await
            .unwrap()
            .unwrap();
        let user = register(&service, "hopeful@example.com").await;
        let pending = service.request_admin(&user, Some("Finance Report")).await.unwrap();

        let promoted = service
            .change_role(&boss, pending.id, Role::Superadmin, None)
            .await
            .unwrap();
        assert_eq!(promoted.admin_request, AdminRequest::None);
        assert!(service.pending_requests().await.unwrap().is_empty());

        service.change_role(&promoted, boss.id, Role::User, None).await.unwrap();
        assert!(matches!(
            service.handle_request(promoted.id, true, None).await,
            Err(ServiceError::Conflict(_))
        ));
        let superadmins = state.store.users_with_roles(&[Role::Superadmin]).await.unwrap();
        assert_eq!(superadmins.len(), 1);
        assert_eq!(superadmins[0].id, promoted.id);
    }

    #[tokio::test]
    async fn concurrent_demotions_leave_a_superadmin() {
        let state = state();
        let service = UserService::new(&state);
        let boss = service
            .seed_superadmin("Boss", "boss@example.com", "boss-pass")
            .await
            .unwrap()
            .unwrap();
        let second = register(&service, "second@example.com").await;
        service
            .change_role(&boss, second.id, Role::Superadmin, None)
            .await
            .unwrap();

        let (first, other) = tokio::join!(
            service.change_role(&boss, boss.id, Role::Admin, None),
            service.change_role(&second, second.id, Role::Admin, None),
        );
        assert_eq!([first.is_ok(), other.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(
            state.store.users_with_roles(&[Role::Superadmin]).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let state = state();
        let service = UserService::new(&state);
        assert!(service
            .seed_superadmin("Boss", "boss@example.com", "boss-pass")
            .await
            .unwrap()
            .is_some());
        assert!(service
            .seed_superadmin("Boss", "boss@example.com", "boss-pass")
            .await
            .unwrap()
            .is_none());
    }
}
