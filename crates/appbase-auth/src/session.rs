//! End-user session authority: access and refresh tokens.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use appbase_core::AppError;
use appbase_core::config::AuthConfig;
use appbase_core::result::AppResult;
use appbase_database::store::{OrganizationStore, UserStore};
use appbase_entity::organization::OrgRole;
use appbase_entity::user::User;

use crate::jwt::{TokenCodec, TokenKind, UserClaims};

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Long-lived token for [`SessionAuthority::refresh`].
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Issues and validates end-user tokens scoped to (user, tenant, organization).
///
/// Refresh tokens are stateless and not rotated: exchanging one does not
/// invalidate it, it stays usable until its own expiry.
#[derive(Clone)]
pub struct SessionAuthority {
    codec: TokenCodec,
    users: Arc<dyn UserStore>,
    organizations: Arc<dyn OrganizationStore>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for SessionAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthority")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl SessionAuthority {
    /// Create the authority from auth configuration.
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserStore>,
        organizations: Arc<dyn OrganizationStore>,
    ) -> Self {
        Self {
            codec: TokenCodec::new(&config.jwt_secret),
            users,
            organizations,
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
        }
    }

    /// Access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Issue an access token. `org_id == 0` means no organization scope.
    pub fn issue_access(
        &self,
        user_id: i64,
        tenant_id: i64,
        org_id: i64,
        org_role: Option<OrgRole>,
    ) -> AppResult<String> {
        let claims = UserClaims::new(TokenKind::Access, user_id, tenant_id, org_id, org_role);
        Ok(self.codec.issue(claims, self.access_ttl)?)
    }

    /// Issue a refresh token. The role is left out and re-derived on refresh.
    pub fn issue_refresh(&self, user_id: i64, tenant_id: i64, org_id: i64) -> AppResult<String> {
        let claims = UserClaims::new(TokenKind::Refresh, user_id, tenant_id, org_id, None);
        Ok(self.codec.issue(claims, self.refresh_ttl)?)
    }

    /// Issue both tokens for the same scope.
    pub fn issue_pair(
        &self,
        user_id: i64,
        tenant_id: i64,
        organization: Option<(i64, OrgRole)>,
    ) -> AppResult<TokenPair> {
        let (org_id, org_role) = match organization {
            Some((id, role)) => (id, Some(role)),
            None => (0, None),
        };
        Ok(TokenPair {
            access_token: self.issue_access(user_id, tenant_id, org_id, org_role)?,
            refresh_token: self.issue_refresh(user_id, tenant_id, org_id)?,
            expires_in: self.access_ttl.as_secs(),
        })
    }

    /// Validate a bearer token; only access tokens are accepted.
    pub fn validate_access(&self, token: &str) -> AppResult<UserClaims> {
        self.codec
            .validate(token, TokenKind::Access)
            .map_err(|e| {
                debug!(reason = %e, "Rejected access token");
                AppError::from(e)
            })
    }

    /// Validate a refresh token; only refresh tokens are accepted.
    pub fn validate_refresh(&self, token: &str) -> AppResult<UserClaims> {
        self.codec
            .validate(token, TokenKind::Refresh)
            .map_err(|e| {
                debug!(reason = %e, "Rejected refresh token");
                AppError::from(e)
            })
    }

    /// Exchange a refresh token issued for `tenant_id` for a new pair.
    ///
    /// A token issued for another tenant is an `InvalidCredential`. The user
    /// must still exist and be active. The organization role is looked up
    /// again; if the membership is gone the new pair is unscoped.
    pub async fn refresh(
        &self,
        tenant_id: i64,
        refresh_token: &str,
    ) -> AppResult<(User, TokenPair)> {
        let claims = self.validate_refresh(refresh_token)?;
        if claims.app_id != tenant_id {
            debug!(
                token_app_id = claims.app_id,
                tenant_id, "Refresh token from another tenant"
            );
            return Err(AppError::invalid_credential(
                "Refresh token was issued for another app",
            ));
        }

        let user = self
            .users
            .find_user(claims.user_id)
            .await?
            .ok_or_else(|| AppError::invalid_credential("User not found"))?;
        if !user.is_active {
            return Err(AppError::forbidden("User is disabled"));
        }

        let organization = self.current_membership(&claims).await?;
        info!(
            user_id = user.id,
            tenant_id,
            org_id = organization.map(|(id, _)| id).unwrap_or(0),
            "Session refreshed"
        );
        let tokens = self.issue_pair(user.id, tenant_id, organization)?;
        Ok((user, tokens))
    }

    async fn current_membership(&self, claims: &UserClaims) -> AppResult<Option<(i64, OrgRole)>> {
        if claims.org_id == 0 {
            return Ok(None);
        }
        let in_tenant = self
            .organizations
            .find_organization(claims.org_id)
            .await?
            .is_some_and(|o| o.tenant_id == claims.app_id);
        if !in_tenant {
            return Ok(None);
        }
        Ok(self
            .organizations
            .find_member(claims.org_id, claims.user_id)
            .await?
            .map(|m| (claims.org_id, m.role)))
    }
}
