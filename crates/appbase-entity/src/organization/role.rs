//! Organization member role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a member can hold within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "org_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrgRole {
    /// Full control, including deletion and role changes.
    Owner,
    /// Manages members and invitations.
    Admin,
    /// Regular member.
    Member,
}

impl OrgRole {
    /// Owner or admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Owner only.
    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner)
    }

    /// Return the role as it appears in tokens and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
        }
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrgRole {
    type Err = appbase_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OWNER" => Ok(Self::Owner),
            "ADMIN" => Ok(Self::Admin),
            "MEMBER" => Ok(Self::Member),
            _ => Err(appbase_core::AppError::validation(format!(
                "Invalid organization role: '{s}'. Expected one of: OWNER, ADMIN, MEMBER"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_includes_owner() {
        assert!(OrgRole::Owner.is_admin());
        assert!(OrgRole::Admin.is_admin());
        assert!(!OrgRole::Member.is_admin());
        assert!(!OrgRole::Admin.is_owner());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("owner".parse::<OrgRole>().unwrap(), OrgRole::Owner);
        assert_eq!("MEMBER".parse::<OrgRole>().unwrap(), OrgRole::Member);
        assert!("guest".parse::<OrgRole>().is_err());
    }

    #[test]
    fn test_serde_uses_uppercase() {
        assert_eq!(serde_json::to_string(&OrgRole::Admin).unwrap(), "\"ADMIN\"");
    }
}
