//! User-to-tenant association.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Associates a user with a tenant; unique per (user, tenant).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserTenantLink {
    /// Link identifier.
    pub id: i64,
    /// The user.
    pub user_id: i64,
    /// The tenant.
    pub tenant_id: i64,
    /// Tenant-specific billing customer reference.
    pub billing_customer_id: Option<String>,
    /// When the user first authenticated within the tenant.
    pub enabled_at: DateTime<Utc>,
}
