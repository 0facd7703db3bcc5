//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An end-user account, shared across tenants.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Email address; device-only accounts have none.
    pub email: Option<String>,
    /// Argon2 password hash, absent for passwordless accounts.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Device identifier for device login.
    pub device_id: Option<String>,
    /// Subject id at an external OAuth provider.
    pub external_id: Option<String>,
    /// Disabled users cannot authenticate.
    pub is_active: bool,
    /// Whether the email address has been verified.
    pub is_verified: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether at least one authentication method is usable.
    pub fn has_credential(&self) -> bool {
        self.password_hash.is_some() || self.device_id.is_some() || self.external_id.is_some()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address.
    pub email: Option<String>,
    /// Pre-hashed password.
    pub password_hash: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Device identifier.
    pub device_id: Option<String>,
    /// External OAuth subject id.
    pub external_id: Option<String>,
}

impl CreateUser {
    /// Whether the new account would be able to authenticate.
    pub fn has_credential(&self) -> bool {
        self.password_hash.is_some() || self.device_id.is_some() || self.external_id.is_some()
    }
}
