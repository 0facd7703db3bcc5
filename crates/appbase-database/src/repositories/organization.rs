//! Organization, membership and invitation repository implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use appbase_core::error::{AppError, ErrorKind};
use appbase_core::result::AppResult;
use appbase_entity::organization::invitation::CreateInvitation;
use appbase_entity::organization::model::{CreateOrganization, UpdateOrganization};
use appbase_entity::organization::{
    InvitationStatus, OrgRole, Organization, OrganizationInvitation, OrganizationMember,
    OrganizationMembership, OrganizationSummary,
};

use super::unique_violation;
use crate::store::{OrganizationStore, OrganizationTx};

/// Repository for organizations and everything they own.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    /// Create a new organization repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

#[async_trait]
impl OrganizationStore for OrganizationRepository {
    async fn begin(&self) -> AppResult<Box<dyn OrganizationTx>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        Ok(Box::new(PgOrganizationTx { tx }))
    }

    async fn find_organization(&self, id: i64) -> AppResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find organization"))
    }

    async fn list_user_organizations(
        &self,
        tenant_id: i64,
        user_id: i64,
    ) -> AppResult<Vec<OrganizationMembership>> {
        sqlx::query_as::<_, OrganizationMembership>(
            "SELECT o.*, m.role FROM organizations o \
             JOIN organization_members m ON m.organization_id = o.id \
             WHERE o.tenant_id = $1 AND m.user_id = $2 \
             ORDER BY o.created_at ASC, o.id ASC",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list organizations"))
    }

    async fn list_tenant_organizations(
        &self,
        tenant_id: i64,
    ) -> AppResult<Vec<OrganizationSummary>> {
        sqlx::query_as::<_, OrganizationSummary>(
            "SELECT o.*, \
                    (SELECT COUNT(*) FROM organization_members m \
                     WHERE m.organization_id = o.id) AS member_count \
             FROM organizations o WHERE o.tenant_id = $1 \
             ORDER BY o.created_at DESC, o.id DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list tenant organizations"))
    }

    async fn update_organization(
        &self,
        id: i64,
        data: &UpdateOrganization,
    ) -> AppResult<Organization> {
        sqlx::query_as::<_, Organization>(
            "UPDATE organizations SET name = COALESCE($2, name), \
                                      description = COALESCE($3, description), \
                                      is_active = COALESCE($4, is_active), \
                                      updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update organization"))?
        .ok_or_else(|| AppError::not_found(format!("Organization {id} not found")))
    }

    async fn delete_organization(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete organization"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_member(
        &self,
        organization_id: i64,
        user_id: i64,
    ) -> AppResult<Option<OrganizationMember>> {
        sqlx::query_as::<_, OrganizationMember>(
            "SELECT * FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find membership"))
    }

    async fn list_members(&self, organization_id: i64) -> AppResult<Vec<OrganizationMember>> {
        sqlx::query_as::<_, OrganizationMember>(
            "SELECT * FROM organization_members WHERE organization_id = $1 \
             ORDER BY joined_at ASC, id ASC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list members"))
    }

    async fn create_invitation(
        &self,
        data: &CreateInvitation,
    ) -> AppResult<OrganizationInvitation> {
        sqlx::query_as::<_, OrganizationInvitation>(
            "INSERT INTO organization_invitations \
                 (organization_id, invited_by, email, role, token, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(data.organization_id)
        .bind(data.invited_by)
        .bind(&data.email)
        .bind(data.role)
        .bind(&data.token)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("organization_invitations_token_key") => {
                AppError::conflict("Invitation token collision")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create invitation", e),
        })
    }

    async fn find_invitation_by_token(
        &self,
        token: &str,
    ) -> AppResult<Option<OrganizationInvitation>> {
        sqlx::query_as::<_, OrganizationInvitation>(
            "SELECT * FROM organization_invitations WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find invitation"))
    }

    async fn find_invitation(
        &self,
        organization_id: i64,
        id: i64,
    ) -> AppResult<Option<OrganizationInvitation>> {
        sqlx::query_as::<_, OrganizationInvitation>(
            "SELECT * FROM organization_invitations WHERE organization_id = $1 AND id = $2",
        )
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find invitation"))
    }

    async fn list_invitations(
        &self,
        organization_id: i64,
    ) -> AppResult<Vec<OrganizationInvitation>> {
        sqlx::query_as::<_, OrganizationInvitation>(
            "SELECT * FROM organization_invitations WHERE organization_id = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list invitations"))
    }

    async fn resolve_pending_invitation(
        &self,
        id: i64,
        status: InvitationStatus,
    ) -> AppResult<Option<OrganizationInvitation>> {
        if !InvitationStatus::Pending.can_transition_to(status) {
            return Err(AppError::internal(format!("Invitation cannot move to {status}")));
        }
        sqlx::query_as::<_, OrganizationInvitation>(
            "UPDATE organization_invitations SET status = $2 \
             WHERE id = $1 AND status = 'PENDING' RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update invitation status"))
    }
}

/// An open PostgreSQL transaction. Dropping it rolls back.
pub struct PgOrganizationTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrganizationTx for PgOrganizationTx {
    async fn insert_organization(&mut self, data: &CreateOrganization) -> AppResult<Organization> {
        sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (tenant_id, name, slug, description) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(data.tenant_id)
        .bind(&data.name)
        .bind(&data.slug)
        .bind(&data.description)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("organizations_tenant_slug_key") => AppError::conflict(format!(
                "Organization slug '{}' already exists",
                data.slug
            )),
            _ => AppError::with_source(ErrorKind::Database, "Failed to create organization", e),
        })
    }

    async fn insert_member(
        &mut self,
        organization_id: i64,
        user_id: i64,
        role: OrgRole,
    ) -> AppResult<OrganizationMember> {
        sqlx::query_as::<_, OrganizationMember>(
            "INSERT INTO organization_members (organization_id, user_id, role) \
             VALUES ($1, $2, $3) \
             RETURNING *",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("organization_members_org_user_key") => {
                AppError::conflict("User is already a member of this organization")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to add member", e),
        })
    }

    async fn lock_members(&mut self, organization_id: i64) -> AppResult<Vec<OrganizationMember>> {
        sqlx::query_as::<_, OrganizationMember>(
            "SELECT * FROM organization_members WHERE organization_id = $1 \
             ORDER BY id FOR UPDATE",
        )
        .bind(organization_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_error("Failed to lock members"))
    }

    async fn update_member_role(
        &mut self,
        organization_id: i64,
        user_id: i64,
        role: OrgRole,
    ) -> AppResult<OrganizationMember> {
        sqlx::query_as::<_, OrganizationMember>(
            "UPDATE organization_members SET role = $3, updated_at = NOW() \
             WHERE organization_id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("Failed to update member role"))?
        .ok_or_else(|| AppError::not_found("Membership not found"))
    }

    async fn remove_member(&mut self, organization_id: i64, user_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to remove member"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn accept_invitation(&mut self, id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE organization_invitations SET status = 'ACCEPTED', accepted_at = NOW() \
             WHERE id = $1 AND status = 'PENDING'",
        )
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("Failed to accept invitation"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(db_error("Failed to commit transaction"))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(db_error("Failed to roll back transaction"))
    }
}
