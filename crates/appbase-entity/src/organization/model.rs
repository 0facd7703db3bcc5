//! Organization entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An organization within a tenant; the slug is unique per tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    /// Unique organization identifier.
    pub id: i64,
    /// Owning tenant.
    pub tenant_id: i64,
    /// Display name.
    pub name: String,
    /// Slug, unique within the tenant.
    pub slug: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Whether the organization is active.
    pub is_active: bool,
    /// When the organization was created.
    pub created_at: DateTime<Utc>,
    /// When the organization was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    /// Owning tenant.
    pub tenant_id: i64,
    /// Display name.
    pub name: String,
    /// Slug.
    pub slug: String,
    /// Description.
    pub description: Option<String>,
}

/// Partial update of an organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrganization {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// An organization seen from one member, together with that member's role.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrganizationMembership {
    /// The organization.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub organization: Organization,
    /// The member's role in it.
    pub role: super::role::OrgRole,
}

/// An organization with its member count, for the admin console.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrganizationSummary {
    /// The organization.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub organization: Organization,
    /// Number of memberships.
    pub member_count: i64,
}
