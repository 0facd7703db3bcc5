//! Organization and invitation configuration.

use serde::{Deserialize, Serialize};

/// Organization membership settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationConfig {
    /// Days an invitation stays acceptable after issuance.
    #[serde(default = "default_invitation_ttl")]
    pub invitation_ttl_days: i64,
    /// Random bytes in an invitation token (hex encoded, so twice as many chars).
    #[serde(default = "default_token_bytes")]
    pub invitation_token_bytes: usize,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            invitation_ttl_days: default_invitation_ttl(),
            invitation_token_bytes: default_token_bytes(),
        }
    }
}

fn default_invitation_ttl() -> i64 {
    7
}

fn default_token_bytes() -> usize {
    32
}
