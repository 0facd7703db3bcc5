//! Organization invitation entity and its status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::role::OrgRole;

/// Lifecycle state of an invitation.
///
/// `Pending` is the only non-terminal state:
/// `Pending -> Accepted` (before expiry), `Pending -> Revoked`,
/// `Pending -> Expired` (on first access after expiry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum InvitationStatus {
    /// Issued and not yet used.
    Pending,
    /// Consumed; a membership was created.
    Accepted,
    /// Accessed after its expiry window.
    Expired,
    /// Withdrawn by an organization admin.
    Revoked,
}

impl InvitationStatus {
    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: InvitationStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Expired)
                | (Self::Pending, Self::Revoked)
        )
    }

    /// Return the status as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Expired => "EXPIRED",
            Self::Revoked => "REVOKED",
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An invitation to join an organization, redeemed with an opaque token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrganizationInvitation {
    /// Invitation identifier.
    pub id: i64,
    /// Target organization.
    pub organization_id: i64,
    /// User who issued the invitation.
    pub invited_by: i64,
    /// Invitee email address.
    pub email: String,
    /// Role granted on acceptance.
    pub role: OrgRole,
    /// Single-use lookup token.
    pub token: String,
    /// Current lifecycle state.
    pub status: InvitationStatus,
    /// When the invitation was issued.
    pub created_at: DateTime<Utc>,
    /// Acceptance deadline.
    pub expires_at: DateTime<Utc>,
    /// When the invitation was accepted.
    pub accepted_at: Option<DateTime<Utc>>,
}

impl OrganizationInvitation {
    /// Whether the acceptance deadline has passed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Data required to issue an invitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitation {
    /// Target organization.
    pub organization_id: i64,
    /// Issuing user.
    pub invited_by: i64,
    /// Invitee email.
    pub email: String,
    /// Role granted on acceptance.
    pub role: OrgRole,
    /// Opaque token.
    pub token: String,
    /// Acceptance deadline.
    pub expires_at: DateTime<Utc>,
}
