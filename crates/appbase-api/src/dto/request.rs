//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use appbase_core::AppError;
use appbase_core::result::AppResult;
use appbase_entity::organization::OrgRole;
use appbase_entity::organization::model::UpdateOrganization;

/// Run `validator` rules and convert failures into `Validation` errors.
pub fn validate_request<T: Validate>(req: &T) -> AppResult<()> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}

/// Email/password signup.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Email/password login.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Anonymous device login.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeviceLoginRequest {
    /// Stable device identifier chosen by the client.
    #[validate(length(min = 1, max = 255, message = "device_id is required"))]
    pub device_id: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    /// Refresh token.
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Create organization request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    /// Name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// URL-safe slug, unique per app.
    #[validate(length(min = 1, max = 64))]
    pub slug: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial organization update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateOrganizationRequest {
    /// New name.
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
}

impl From<UpdateOrganizationRequest> for UpdateOrganization {
    fn from(req: UpdateOrganizationRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            is_active: req.is_active,
        }
    }
}

/// Change a member's role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMemberRoleRequest {
    /// New role.
    pub role: OrgRole,
}

/// Invite an email address into an organization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInvitationRequest {
    /// Invitee email.
    #[validate(email)]
    pub email: String,
    /// Role granted on acceptance.
    #[serde(default = "default_invite_role")]
    pub role: OrgRole,
}

fn default_invite_role() -> OrgRole {
    OrgRole::Member
}

/// Accept an invitation by token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AcceptInvitationRequest {
    /// Invitation token.
    #[validate(length(min = 1))]
    pub token: String,
}

/// Admin console sign-in with a third-party ID token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdminLoginRequest {
    /// ID token from the identity provider.
    #[validate(length(min = 1, message = "id_token is required"))]
    pub id_token: String,
}

/// Toggle a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTenantStatusRequest {
    /// New active flag.
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use appbase_core::error::ErrorKind;

    #[test]
    fn test_invitation_role_defaults_to_member() {
        let req: CreateInvitationRequest =
            serde_json::from_str(r#"{"email":"a@example.com"}"#).unwrap();
        assert_eq!(req.role, OrgRole::Member);
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_validation_failure_maps_to_validation_kind() {
        let req = DeviceLoginRequest {
            device_id: String::new(),
        };
        let err = validate_request(&req).unwrap_err();
        assert!(err.is(ErrorKind::Validation));
    }
}
