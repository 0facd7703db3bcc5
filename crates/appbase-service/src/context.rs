//! Request-scoped principals attached by the authorization middleware.

use serde::{Deserialize, Serialize};

use appbase_auth::jwt::UserClaims;
use appbase_core::AppError;
use appbase_entity::tenant::Tenant;
use appbase_entity::user::User;

/// The tenant resolved from the API key, plus the end user when one is
/// authenticated.
///
/// `user` and `claims` are either both present or both absent.
#[derive(Debug, Clone)]
pub struct AuthenticatedContext {
    /// The calling tenant.
    pub tenant: Tenant,
    /// The authenticated end user.
    pub user: Option<User>,
    /// Claims of the presented access token.
    pub claims: Option<UserClaims>,
}

impl AuthenticatedContext {
    /// Context for a tenant-only request.
    pub fn anonymous(tenant: Tenant) -> Self {
        Self {
            tenant,
            user: None,
            claims: None,
        }
    }

    /// Context with an authenticated user.
    pub fn with_user(tenant: Tenant, user: User, claims: UserClaims) -> Self {
        Self {
            tenant,
            user: Some(user),
            claims: Some(claims),
        }
    }

    /// Tenant id.
    pub fn tenant_id(&self) -> i64 {
        self.tenant.id
    }

    /// The authenticated user, or `Unauthorized` on an anonymous context.
    pub fn require_user(&self) -> Result<&User, AppError> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }

    /// Whether an end user is attached.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// A signed-in administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminContext {
    /// Administrator email.
    pub email: String,
    /// Display name.
    pub name: String,
}
