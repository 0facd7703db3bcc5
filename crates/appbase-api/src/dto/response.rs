//! Response DTOs.

use serde::{Deserialize, Serialize};

use appbase_auth::session::TokenPair;
use appbase_entity::organization::OrgRole;
use appbase_entity::user::User;
use appbase_service::account::AuthOutcome;
use appbase_service::context::AuthenticatedContext;

const TOKEN_TYPE: &str = "Bearer";

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Token pair as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: pair.expires_in,
        }
    }
}

/// Signup/login response.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// Issued tokens.
    #[serde(flatten)]
    pub tokens: TokenResponse,
    /// The signed-in user.
    pub user: User,
}

impl From<AuthOutcome> for AuthResponse {
    fn from(outcome: AuthOutcome) -> Self {
        Self {
            tokens: outcome.tokens.into(),
            user: outcome.user,
        }
    }
}

/// What the optional-user gate saw.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    /// Whether a valid bearer token was presented.
    pub authenticated: bool,
    /// Calling app.
    pub app_id: i64,
    /// The user, when authenticated.
    pub user: Option<User>,
    /// Organization the presented token is scoped to.
    pub org_id: Option<i64>,
    /// Role carried by the presented token.
    pub org_role: Option<OrgRole>,
}

impl From<&AuthenticatedContext> for SessionResponse {
    fn from(ctx: &AuthenticatedContext) -> Self {
        let scope = ctx
            .claims
            .as_ref()
            .and_then(|c| c.org_role().map(|role| (c.org_id, role)));
        Self {
            authenticated: ctx.is_authenticated(),
            app_id: ctx.tenant_id(),
            user: ctx.user.clone(),
            org_id: scope.map(|(id, _)| id),
            org_role: scope.map(|(_, role)| role),
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// `connected` or `unavailable`.
    pub database: String,
    /// Version.
    pub version: String,
}
