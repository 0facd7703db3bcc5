//! Claim sets carried by end-user and admin session tokens.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use appbase_entity::organization::OrgRole;

/// The `type` discriminator of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived end-user token for API requests.
    Access,
    /// Long-lived end-user token exchanged for a new pair.
    Refresh,
    /// Admin console session carried in a cookie.
    AdminSession,
}

impl TokenKind {
    /// Wire value of the discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
            Self::AdminSession => "admin_session",
        }
    }
}

/// Common behaviour of every claim set the codec signs.
pub trait TokenClaims: Serialize + DeserializeOwned {
    /// Set issued-at and expires-at, in seconds since the epoch.
    fn set_lifetime(&mut self, iat: i64, exp: i64);
}

/// End-user access/refresh token payload.
///
/// `org_id == 0` and an empty `org_role` mean no organization scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// The authenticated user.
    pub user_id: i64,
    /// The tenant the session was issued for.
    pub app_id: i64,
    /// Organization scope, 0 when unscoped.
    #[serde(default)]
    pub org_id: i64,
    /// Role within `org_id`, empty when unscoped or on refresh tokens.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub org_role: String,
    /// Token kind discriminator.
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
}

impl UserClaims {
    /// Unstamped claims of the given kind.
    pub fn new(kind: TokenKind, user_id: i64, app_id: i64, org_id: i64, org_role: Option<OrgRole>) -> Self {
        Self {
            user_id,
            app_id,
            org_id,
            org_role: org_role.map(|r| r.as_str().to_string()).unwrap_or_default(),
            kind,
            exp: 0,
            iat: 0,
        }
    }

    /// Parsed organization role, if the token is organization-scoped.
    pub fn org_role(&self) -> Option<OrgRole> {
        if self.org_id == 0 || self.org_role.is_empty() {
            return None;
        }
        self.org_role.parse().ok()
    }
}

impl TokenClaims for UserClaims {
    fn set_lifetime(&mut self, iat: i64, exp: i64) {
        self.iat = iat;
        self.exp = exp;
    }
}

/// Admin console session payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Allowlisted administrator email.
    pub email: String,
    /// Display name reported by the identity provider.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Always [`TokenKind::AdminSession`].
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
}

impl AdminClaims {
    /// Unstamped admin claims.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            kind: TokenKind::AdminSession,
            exp: 0,
            iat: 0,
        }
    }
}

impl TokenClaims for AdminClaims {
    fn set_lifetime(&mut self, iat: i64, exp: i64) {
        self.iat = iat;
        self.exp = exp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unscoped_claims_have_no_role() {
        let claims = UserClaims::new(TokenKind::Access, 1, 2, 0, None);
        assert_eq!(claims.org_role(), None);
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["type"], "access");
        assert_eq!(json["org_id"], 0);
        assert!(json.get("org_role").is_none());
    }

    #[test]
    fn test_scoped_claims_parse_role() {
        let claims = UserClaims::new(TokenKind::Access, 1, 2, 7, Some(OrgRole::Admin));
        assert_eq!(claims.org_role, "ADMIN");
        assert_eq!(claims.org_role(), Some(OrgRole::Admin));
    }

    #[test]
    fn test_kind_wire_values() {
        assert_eq!(
            serde_json::to_string(&TokenKind::AdminSession).unwrap(),
            "\"admin_session\""
        );
        assert_eq!(TokenKind::Refresh.as_str(), "refresh");
    }
}
