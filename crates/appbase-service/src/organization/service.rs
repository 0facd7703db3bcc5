//! Organizations and memberships.
//!
//! Every mutating operation checks the acting user's role itself; callers
//! do not need to call [`OrganizationService::is_admin`] first.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use appbase_core::AppError;
use appbase_core::config::OrganizationConfig;
use appbase_core::result::AppResult;
use appbase_database::store::{OrganizationStore, OrganizationTx};
use appbase_entity::organization::model::{CreateOrganization, UpdateOrganization};
use appbase_entity::organization::{
    OrgRole, Organization, OrganizationMember, OrganizationMembership,
};

/// Organization membership engine.
#[derive(Clone)]
pub struct OrganizationService {
    pub(super) store: Arc<dyn OrganizationStore>,
    pub(super) invitation_ttl: chrono::Duration,
    pub(super) invitation_token_bytes: usize,
}

impl std::fmt::Debug for OrganizationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganizationService")
            .field("invitation_ttl", &self.invitation_ttl)
            .finish_non_exhaustive()
    }
}

impl OrganizationService {
    /// Create the engine over an organization store.
    pub fn new(store: Arc<dyn OrganizationStore>, config: &OrganizationConfig) -> Self {
        Self {
            store,
            invitation_ttl: chrono::Duration::days(config.invitation_ttl_days),
            invitation_token_bytes: config.invitation_token_bytes.max(16),
        }
    }

    /// Whether the user is an OWNER of the organization.
    pub async fn is_owner(&self, org_id: i64, user_id: i64) -> AppResult<bool> {
        Ok(self
            .store
            .find_member(org_id, user_id)
            .await?
            .is_some_and(|m| m.role.is_owner()))
    }

    /// Whether the user is an OWNER or ADMIN of the organization.
    pub async fn is_admin(&self, org_id: i64, user_id: i64) -> AppResult<bool> {
        Ok(self
            .store
            .find_member(org_id, user_id)
            .await?
            .is_some_and(|m| m.role.is_admin()))
    }

    /// Create an organization with `creator_id` as its OWNER, atomically.
    #[instrument(skip(self, name, description))]
    pub async fn create_organization(
        &self,
        tenant_id: i64,
        creator_id: i64,
        name: &str,
        slug: &str,
        description: Option<String>,
    ) -> AppResult<Organization> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Organization name is required"));
        }
        validate_slug(slug)?;

        let mut tx = self.store.begin().await?;
        let result = insert_with_owner(
            tx.as_mut(),
            &CreateOrganization {
                tenant_id,
                name: name.to_string(),
                slug: slug.to_string(),
                description,
            },
            creator_id,
        )
        .await;

        let organization = finish(tx, result).await?;
        info!(org_id = organization.id, "Organization created");
        Ok(organization)
    }

    /// Organizations of the tenant the user belongs to.
    pub async fn list_for_user(
        &self,
        tenant_id: i64,
        user_id: i64,
    ) -> AppResult<Vec<OrganizationMembership>> {
        self.store.list_user_organizations(tenant_id, user_id).await
    }

    /// One organization with the caller's role; `NotFound` for non-members.
    pub async fn get(
        &self,
        tenant_id: i64,
        user_id: i64,
        org_id: i64,
    ) -> AppResult<OrganizationMembership> {
        let organization = self.scoped(tenant_id, org_id).await?;
        let member = self.membership(org_id, user_id).await?;
        Ok(OrganizationMembership {
            organization,
            role: member.role,
        })
    }

    /// Update name, description or active flag. Requires ADMIN.
    #[instrument(skip(self, data))]
    pub async fn update(
        &self,
        tenant_id: i64,
        actor_id: i64,
        org_id: i64,
        data: &UpdateOrganization,
    ) -> AppResult<Organization> {
        self.scoped(tenant_id, org_id).await?;
        self.require_admin(org_id, actor_id).await?;
        if data.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("Organization name cannot be empty"));
        }
        let organization = self.store.update_organization(org_id, data).await?;
        info!("Organization updated");
        Ok(organization)
    }

    /// Delete the organization, its members and invitations. Requires OWNER.
    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: i64, actor_id: i64, org_id: i64) -> AppResult<()> {
        self.scoped(tenant_id, org_id).await?;
        if !self.is_owner(org_id, actor_id).await? {
            return Err(AppError::forbidden("Only the owner can delete the organization"));
        }
        if !self.store.delete_organization(org_id).await? {
            return Err(AppError::not_found("Organization not found"));
        }
        info!("Organization deleted");
        Ok(())
    }

    /// Members of the organization. Requires membership.
    pub async fn list_members(
        &self,
        tenant_id: i64,
        actor_id: i64,
        org_id: i64,
    ) -> AppResult<Vec<OrganizationMember>> {
        self.scoped(tenant_id, org_id).await?;
        self.membership(org_id, actor_id).await?;
        self.store.list_members(org_id).await
    }

    /// Remove a member.
    ///
    /// Members may remove themselves; removing anyone else requires ADMIN,
    /// and removing an OWNER requires OWNER. The last OWNER cannot leave.
    #[instrument(skip(self))]
    pub async fn remove_member(
        &self,
        tenant_id: i64,
        actor_id: i64,
        org_id: i64,
        user_id: i64,
    ) -> AppResult<()> {
        self.scoped(tenant_id, org_id).await?;

        let mut tx = self.store.begin().await?;
        let result = async {
            let members = tx.lock_members(org_id).await?;
            let actor = find_in(&members, actor_id)?;
            let target = find_in(&members, user_id)?;

            if actor_id != user_id {
                if !actor.role.is_admin() {
                    return Err(AppError::forbidden("Permission denied"));
                }
                if target.role.is_owner() && !actor.role.is_owner() {
                    return Err(AppError::forbidden("Only an owner can remove an owner"));
                }
            }
            if target.role.is_owner() {
                ensure_not_last_owner(&members)?;
            }
            if !tx.remove_member(org_id, user_id).await? {
                return Err(AppError::not_found("Member not found"));
            }
            Ok::<(), AppError>(())
        }
        .await;

        finish(tx, result).await?;
        info!("Member removed");
        Ok(())
    }

    /// Change a member's role. Requires OWNER; the last OWNER cannot be demoted.
    #[instrument(skip(self))]
    pub async fn update_member_role(
        &self,
        tenant_id: i64,
        actor_id: i64,
        org_id: i64,
        user_id: i64,
        role: OrgRole,
    ) -> AppResult<OrganizationMember> {
        self.scoped(tenant_id, org_id).await?;

        let mut tx = self.store.begin().await?;
        let result = async {
            let members = tx.lock_members(org_id).await?;
            if !members
                .iter()
                .any(|m| m.user_id == actor_id && m.role.is_owner())
            {
                return Err(AppError::forbidden("Only the owner can change roles"));
            }
            let target = find_in(&members, user_id)?;
            if target.role.is_owner() && !role.is_owner() {
                ensure_not_last_owner(&members)?;
            }
            tx.update_member_role(org_id, user_id, role).await
        }
        .await;

        let member = finish(tx, result).await?;
        info!(role = %role, "Member role changed");
        Ok(member)
    }

    /// The organization, if it exists and belongs to the tenant.
    pub(super) async fn scoped(&self, tenant_id: i64, org_id: i64) -> AppResult<Organization> {
        self.store
            .find_organization(org_id)
            .await?
            .filter(|o| o.tenant_id == tenant_id)
            .ok_or_else(|| AppError::not_found("Organization not found"))
    }

    pub(super) async fn membership(
        &self,
        org_id: i64,
        user_id: i64,
    ) -> AppResult<OrganizationMember> {
        self.store
            .find_member(org_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Member not found"))
    }

    pub(super) async fn require_admin(&self, org_id: i64, user_id: i64) -> AppResult<OrgRole> {
        match self.store.find_member(org_id, user_id).await? {
            Some(member) if member.role.is_admin() => Ok(member.role),
            _ => Err(AppError::forbidden("Permission denied")),
        }
    }
}

async fn insert_with_owner(
    tx: &mut dyn OrganizationTx,
    data: &CreateOrganization,
    owner_id: i64,
) -> AppResult<Organization> {
    let organization = tx.insert_organization(data).await?;
    tx.insert_member(organization.id, owner_id, OrgRole::Owner)
        .await?;
    Ok(organization)
}

/// Commit on success, roll back on failure.
pub(super) async fn finish<T>(tx: Box<dyn OrganizationTx>, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback after failed organization write");
            }
            Err(e)
        }
    }
}

fn find_in(members: &[OrganizationMember], user_id: i64) -> AppResult<&OrganizationMember> {
    members
        .iter()
        .find(|m| m.user_id == user_id)
        .ok_or_else(|| AppError::not_found("Member not found"))
}

fn ensure_not_last_owner(members: &[OrganizationMember]) -> AppResult<()> {
    if members.iter().filter(|m| m.role.is_owner()).count() <= 1 {
        return Err(AppError::conflict(
            "An organization must keep at least one owner",
        ));
    }
    Ok(())
}

/// Slugs are 1-64 characters of lowercase ASCII letters, digits and hyphens.
fn validate_slug(slug: &str) -> AppResult<()> {
    let valid = !slug.is_empty()
        && slug.len() <= 64
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(AppError::validation(format!("Invalid organization slug: '{slug}'")));
    }
    Ok(())
}
