//! Tenant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A client application sharing the platform, identified by its API key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    /// Unique tenant identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unique URL-safe slug.
    pub slug: String,
    /// Unique opaque API key presented in the `X-API-Key` header.
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Browser origins allowed to call the API on behalf of this tenant.
    pub allowed_origins: Vec<String>,
    /// Inactive tenants reject every API-key-authenticated request.
    pub is_active: bool,
    /// When the tenant was created.
    pub created_at: DateTime<Utc>,
    /// When the tenant was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to register a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    /// Display name.
    pub name: String,
    /// Unique slug.
    pub slug: String,
    /// Unique API key.
    pub api_key: String,
    /// Allowed browser origins.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}
