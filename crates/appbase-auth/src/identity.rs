//! External identity provider verification for admin sign-in.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use appbase_core::config::AdminConfig;
use appbase_core::error::{AppError, ErrorKind};
use appbase_core::result::AppResult;

/// Identity asserted by the external provider for a presented ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Token issuer.
    pub issuer: String,
    /// Subject identifier at the provider.
    pub subject: String,
    /// Verified email address, may be empty.
    pub email: String,
    /// Display name, may be empty.
    pub name: String,
}

/// Verifies an identity-provider ID token.
#[async_trait]
pub trait IdentityVerifier: Send + Sync + 'static {
    /// Verify the token and return the identity it asserts.
    ///
    /// Rejected tokens are `InvalidCredential`; transport failures and
    /// timeouts are `ExternalService`.
    async fn verify(&self, id_token: &str) -> AppResult<ExternalIdentity>;
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    iss: Option<String>,
    aud: Option<String>,
    sub: Option<String>,
    email: Option<String>,
    email_verified: Option<String>,
    name: Option<String>,
}

/// Verifies Google ID tokens through the `tokeninfo` endpoint.
#[derive(Debug, Clone)]
pub struct GoogleIdentityVerifier {
    client: reqwest::Client,
    tokeninfo_url: String,
    client_id: String,
}

impl GoogleIdentityVerifier {
    /// Build a verifier with a client-level request timeout.
    pub fn new(config: &AdminConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.identity_timeout())
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build identity provider client",
                    e,
                )
            })?;
        Ok(Self {
            client,
            tokeninfo_url: config.tokeninfo_url.clone(),
            client_id: config.google_client_id.clone(),
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, id_token: &str) -> AppResult<ExternalIdentity> {
        if self.client_id.is_empty() {
            return Err(AppError::configuration(
                "admin.google_client_id is not configured",
            ));
        }

        let url = reqwest::Url::parse_with_params(&self.tokeninfo_url, &[("id_token", id_token)])
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Invalid tokeninfo URL", e)
            })?;

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "Identity provider request failed");
            AppError::with_source(ErrorKind::ExternalService, "Identity provider unavailable", e)
        })?;

        if response.status().is_server_error() {
            return Err(AppError::external_service(format!(
                "Identity provider returned {}",
                response.status()
            )));
        }
        if !response.status().is_success() {
            return Err(AppError::invalid_credential("ID token rejected"));
        }

        let info: TokenInfo = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Unreadable identity provider response",
                e,
            )
        })?;

        if info.aud.as_deref() != Some(self.client_id.as_str()) {
            return Err(AppError::invalid_credential("ID token audience mismatch"));
        }
        let email = match info.email_verified.as_deref() {
            Some("true") => info.email.unwrap_or_default(),
            _ => String::new(),
        };

        Ok(ExternalIdentity {
            issuer: info.iss.unwrap_or_default(),
            subject: info.sub.unwrap_or_default(),
            email,
            name: info.name.unwrap_or_default(),
        })
    }
}
