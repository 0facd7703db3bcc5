//! Organization membership entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::OrgRole;

/// A user's membership in an organization; unique per (organization, user).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrganizationMember {
    /// Membership identifier.
    pub id: i64,
    /// The organization.
    pub organization_id: i64,
    /// The member.
    pub user_id: i64,
    /// Role within the organization.
    pub role: OrgRole,
    /// When the user joined.
    pub joined_at: DateTime<Utc>,
    /// When the membership was last updated.
    pub updated_at: DateTime<Utc>,
}
