//! End-user account flows: signup, login, device login, refresh.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use appbase_auth::password::PasswordHasher;
use appbase_auth::session::{SessionAuthority, TokenPair};
use appbase_core::AppError;
use appbase_core::result::AppResult;
use appbase_database::store::{OrganizationStore, UserStore};
use appbase_entity::tenant::Tenant;
use appbase_entity::user::User;
use appbase_entity::user::model::CreateUser;

use crate::context::AuthenticatedContext;

/// Tokens plus the user they were issued for.
#[derive(Debug, Clone, Serialize)]
pub struct AuthOutcome {
    /// The issued token pair.
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// The authenticated user.
    pub user: User,
}

/// Authenticates end users within a tenant.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    organizations: Arc<dyn OrganizationStore>,
    sessions: Arc<SessionAuthority>,
    hasher: PasswordHasher,
}

impl AccountService {
    /// Create the service.
    pub fn new(
        users: Arc<dyn UserStore>,
        organizations: Arc<dyn OrganizationStore>,
        sessions: Arc<SessionAuthority>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            organizations,
            sessions,
            hasher,
        }
    }

    /// Register an email/password account and sign it in.
    #[instrument(skip(self, tenant, password, name), fields(tenant_id = tenant.id))]
    pub async fn signup(
        &self,
        tenant: &Tenant,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> AppResult<AuthOutcome> {
        let email = normalize_email(email)?;
        self.hasher.check_policy(password)?;
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }

        let user = self
            .users
            .create_user(&CreateUser {
                email: Some(email),
                password_hash: Some(self.hasher.hash(password)?),
                name,
                ..Default::default()
            })
            .await?;
        self.users.link_user_to_tenant(user.id, tenant.id).await?;
        info!(user_id = user.id, "User signed up");

        self.sign_in(tenant, user)
    }

    /// Email/password login. Every credential mismatch looks the same.
    #[instrument(skip(self, tenant, password), fields(tenant_id = tenant.id))]
    pub async fn login(&self, tenant: &Tenant, email: &str, password: &str) -> AppResult<AuthOutcome> {
        let invalid = || AppError::invalid_credential("Invalid email or password");

        let user = self
            .users
            .find_user_by_email(email.trim())
            .await?
            .ok_or_else(invalid)?;
        let Some(hash) = user.password_hash.as_deref() else {
            debug!(user_id = user.id, "Password login for passwordless account");
            return Err(invalid());
        };
        if !self.hasher.verify(password, hash)? {
            return Err(invalid());
        }
        if !user.is_active {
            return Err(AppError::forbidden("Account is disabled"));
        }

        self.users.record_login(user.id).await?;
        self.users.link_user_to_tenant(user.id, tenant.id).await?;
        info!(user_id = user.id, "User logged in");
        self.sign_in(tenant, user)
    }

    /// Find or create the account bound to a device id and sign it in.
    #[instrument(skip(self, tenant, device_id), fields(tenant_id = tenant.id))]
    pub async fn device_login(&self, tenant: &Tenant, device_id: &str) -> AppResult<AuthOutcome> {
        let device_id = device_id.trim();
        if device_id.is_empty() {
            return Err(AppError::validation("device_id is required"));
        }

        let user = match self.users.find_user_by_device_id(device_id).await? {
            Some(user) => user,
            None => {
                let user = self
                    .users
                    .create_user(&CreateUser {
                        device_id: Some(device_id.to_string()),
                        ..Default::default()
                    })
                    .await?;
                info!(user_id = user.id, "Device account created");
                user
            }
        };
        if !user.is_active {
            return Err(AppError::forbidden("Account is disabled"));
        }

        self.users.record_login(user.id).await?;
        self.users.link_user_to_tenant(user.id, tenant.id).await?;
        self.sign_in(tenant, user)
    }

    /// Exchange a refresh token issued for this tenant for a new pair.
    pub async fn refresh(&self, tenant: &Tenant, refresh_token: &str) -> AppResult<AuthOutcome> {
        let (user, tokens) = self.sessions.refresh(tenant.id, refresh_token).await?;
        Ok(AuthOutcome { tokens, user })
    }

    /// The user attached to the request.
    pub fn me(&self, ctx: &AuthenticatedContext) -> AppResult<User> {
        ctx.require_user().cloned()
    }

    /// Tokens scoped to one of the caller's organizations in this tenant.
    pub async fn organization_session(
        &self,
        ctx: &AuthenticatedContext,
        org_id: i64,
    ) -> AppResult<TokenPair> {
        let user = ctx.require_user()?;
        let in_tenant = self
            .organizations
            .find_organization(org_id)
            .await?
            .is_some_and(|o| o.tenant_id == ctx.tenant_id());
        let member = match self.organizations.find_member(org_id, user.id).await? {
            Some(member) if in_tenant => member,
            _ => return Err(AppError::not_found("Organization not found")),
        };
        self.sessions
            .issue_pair(user.id, ctx.tenant_id(), Some((org_id, member.role)))
    }

    fn sign_in(&self, tenant: &Tenant, user: User) -> AppResult<AuthOutcome> {
        let tokens = self.sessions.issue_pair(user.id, tenant.id, None)?;
        Ok(AuthOutcome { tokens, user })
    }
}

fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::validation("A valid email address is required")),
    }
}
