//! Operator console configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Admin console authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Operator emails allowed to sign in. Empty means nobody.
    #[serde(default)]
    pub allowed_emails: Vec<String>,
    /// OAuth client id the identity-provider token must be issued for.
    #[serde(default)]
    pub google_client_id: String,
    /// Identity-provider token verification endpoint.
    #[serde(default = "default_tokeninfo_url")]
    pub tokeninfo_url: String,
    /// Name of the httponly session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Admin session lifetime in hours.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: u64,
    /// Upper bound for the identity-provider round trip, in seconds.
    #[serde(default = "default_identity_timeout")]
    pub identity_timeout_seconds: u64,
}

impl AdminConfig {
    /// Admin session lifetime.
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_hours * 60 * 60)
    }

    /// Identity-provider timeout.
    pub fn identity_timeout(&self) -> Duration {
        Duration::from_secs(self.identity_timeout_seconds)
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            allowed_emails: Vec::new(),
            google_client_id: String::new(),
            tokeninfo_url: default_tokeninfo_url(),
            cookie_name: default_cookie_name(),
            session_ttl_hours: default_session_ttl(),
            identity_timeout_seconds: default_identity_timeout(),
        }
    }
}

fn default_tokeninfo_url() -> String {
    "https://oauth2.googleapis.com/tokeninfo".to_string()
}

fn default_cookie_name() -> String {
    "admin_session".to_string()
}

fn default_session_ttl() -> u64 {
    24
}

fn default_identity_timeout() -> u64 {
    10
}
