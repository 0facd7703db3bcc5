//! Admin console session authority.
//!
//! Admins sign in with an external identity provider; allowlisted emails
//! receive a signed `admin_session` token carried in a cookie.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use appbase_core::AppError;
use appbase_core::config::{AdminConfig, AuthConfig};
use appbase_core::result::AppResult;

use crate::identity::IdentityVerifier;
use crate::jwt::{AdminClaims, TokenCodec, TokenKind};

/// Issuers accepted for Google ID tokens.
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// A signed-in administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    /// Administrator email.
    pub email: String,
    /// Display name.
    pub name: String,
}

/// Verifies admin sign-ins and issues admin session tokens.
#[derive(Clone)]
pub struct AdminSessionAuthority {
    codec: TokenCodec,
    verifier: Arc<dyn IdentityVerifier>,
    allowed_emails: Vec<String>,
    session_ttl: Duration,
}

impl std::fmt::Debug for AdminSessionAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSessionAuthority")
            .field("allowed_emails", &self.allowed_emails.len())
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

impl AdminSessionAuthority {
    /// Create the authority. An empty allowlist admits nobody.
    pub fn new(auth: &AuthConfig, admin: &AdminConfig, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            codec: TokenCodec::new(&auth.jwt_secret),
            verifier,
            allowed_emails: admin
                .allowed_emails
                .iter()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            session_ttl: admin.session_ttl(),
        }
    }

    /// Session lifetime, also used as the cookie max-age.
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Verify an ID token with the provider and re-check its issuer.
    pub async fn verify_external_identity(&self, id_token: &str) -> AppResult<AdminIdentity> {
        let identity = self.verifier.verify(id_token).await?;

        if !GOOGLE_ISSUERS.contains(&identity.issuer.as_str()) {
            warn!(issuer = %identity.issuer, "Rejected ID token from unexpected issuer");
            return Err(AppError::invalid_credential("Invalid token issuer"));
        }
        if identity.email.is_empty() {
            return Err(AppError::invalid_credential("Email not found in token"));
        }

        Ok(AdminIdentity {
            email: identity.email,
            name: identity.name,
        })
    }

    /// Case-insensitive allowlist membership.
    pub fn is_allowlisted(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.allowed_emails.iter().any(|allowed| *allowed == email)
    }

    /// Sign an admin session token.
    pub fn issue_admin_session(&self, email: &str, name: &str) -> AppResult<String> {
        Ok(self
            .codec
            .issue(AdminClaims::new(email, name), self.session_ttl)?)
    }

    /// Validate an admin session token; only `admin_session` tokens are accepted.
    pub fn validate_admin_session(&self, token: &str) -> AppResult<AdminClaims> {
        Ok(self.codec.validate(token, TokenKind::AdminSession)?)
    }

    /// Full sign-in: verify, check the allowlist, issue a session.
    pub async fn sign_in(&self, id_token: &str) -> AppResult<(AdminIdentity, String)> {
        let identity = self.verify_external_identity(id_token).await?;
        if !self.is_allowlisted(&identity.email) {
            warn!(email = %identity.email, "Admin sign-in refused: email not allowlisted");
            return Err(AppError::forbidden("Access denied"));
        }
        let token = self.issue_admin_session(&identity.email, &identity.name)?;
        info!(email = %identity.email, "Admin session issued");
        Ok((identity, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ExternalIdentity;
    use appbase_core::error::ErrorKind;
    use async_trait::async_trait;

    struct FixedVerifier(ExternalIdentity);

    #[async_trait]
    impl IdentityVerifier for FixedVerifier {
        async fn verify(&self, id_token: &str) -> AppResult<ExternalIdentity> {
            if id_token == "good" {
                Ok(self.0.clone())
            } else {
                Err(AppError::invalid_credential("bad token"))
            }
        }
    }

    fn authority(allowed: &[&str], issuer: &str) -> AdminSessionAuthority {
        let auth = AuthConfig {
            jwt_secret: "admin-test-secret".into(),
            ..AuthConfig::default()
        };
        let admin = AdminConfig {
            allowed_emails: allowed.iter().map(|s| s.to_string()).collect(),
            ..AdminConfig::default()
        };
        let verifier = FixedVerifier(ExternalIdentity {
            issuer: issuer.into(),
            subject: "123".into(),
            email: "Root@Example.com".into(),
            name: "Root".into(),
        });
        AdminSessionAuthority::new(&auth, &admin, Arc::new(verifier))
    }

    #[test]
    fn test_empty_allowlist_admits_nobody() {
        let authority = authority(&[], "accounts.google.com");
        assert!(!authority.is_allowlisted("root@example.com"));
        assert!(!authority.is_allowlisted(""));
    }

    #[test]
    fn test_allowlist_is_case_insensitive() {
        let authority = authority(&["ROOT@example.com"], "accounts.google.com");
        assert!(authority.is_allowlisted("root@EXAMPLE.com"));
        assert!(!authority.is_allowlisted("other@example.com"));
    }

    #[tokio::test]
    async fn test_sign_in_issues_valid_session() {
        let authority = authority(&["root@example.com"], "https://accounts.google.com");
        let (identity, token) = authority.sign_in("good").await.unwrap();
        assert_eq!(identity.email, "Root@Example.com");
        let claims = authority.validate_admin_session(&token).unwrap();
        assert_eq!(claims.email, "Root@Example.com");
        assert_eq!(claims.kind, TokenKind::AdminSession);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[tokio::test]
    async fn test_sign_in_rejects_unlisted_email() {
        let authority = authority(&["someone@example.com"], "accounts.google.com");
        let err = authority.sign_in("good").await.unwrap_err();
        assert!(err.is(ErrorKind::Forbidden));
    }

    #[tokio::test]
    async fn test_unexpected_issuer_is_rejected() {
        let authority = authority(&["root@example.com"], "https://evil.example.com");
        let err = authority.verify_external_identity("good").await.unwrap_err();
        assert!(err.is(ErrorKind::InvalidCredential));
    }

    #[test]
    fn test_user_token_is_not_an_admin_session() {
        let authority = authority(&["root@example.com"], "accounts.google.com");
        let user_token = TokenCodec::new("admin-test-secret")
            .issue(
                crate::jwt::UserClaims::new(TokenKind::Access, 1, 1, 0, None),
                Duration::from_secs(60),
            )
            .unwrap();
        let err = authority.validate_admin_session(&user_token).unwrap_err();
        assert!(err.is(ErrorKind::InvalidCredential));
    }
}
