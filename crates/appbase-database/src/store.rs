//! Store traits the authorization core and services program against.
//!
//! The PostgreSQL repositories in [`crate::repositories`] and the
//! [`crate::memory::MemoryStore`] both implement these. Multi-row writes
//! that must be all-or-nothing go through [`OrganizationStore::begin`];
//! dropping an [`OrganizationTx`] without committing discards its writes.

use async_trait::async_trait;

use appbase_core::result::AppResult;
use appbase_entity::organization::invitation::CreateInvitation;
use appbase_entity::organization::model::{CreateOrganization, UpdateOrganization};
use appbase_entity::organization::{
    InvitationStatus, OrgRole, Organization, OrganizationInvitation, OrganizationMember,
    OrganizationMembership, OrganizationSummary,
};
use appbase_entity::tenant::Tenant;
use appbase_entity::tenant::model::CreateTenant;
use appbase_entity::user::model::CreateUser;
use appbase_entity::user::{User, UserTenantLink};

/// Tenant lookups and administration.
#[async_trait]
pub trait TenantStore: Send + Sync + 'static {
    /// Find a tenant by primary key.
    async fn find_tenant(&self, id: i64) -> AppResult<Option<Tenant>>;

    /// Find a tenant by its exact API key.
    async fn find_tenant_by_api_key(&self, api_key: &str) -> AppResult<Option<Tenant>>;

    /// List all tenants, newest first.
    async fn list_tenants(&self) -> AppResult<Vec<Tenant>>;

    /// Register a tenant. Duplicate slug or API key is a conflict.
    async fn create_tenant(&self, data: &CreateTenant) -> AppResult<Tenant>;

    /// Toggle the active flag. `NotFound` if the tenant does not exist.
    async fn set_tenant_active(&self, id: i64, is_active: bool) -> AppResult<Tenant>;
}

/// End-user accounts and their tenant links.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Find a user by primary key.
    async fn find_user(&self, id: i64) -> AppResult<Option<User>>;

    /// Find a user by email, case-insensitively.
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by device identifier.
    async fn find_user_by_device_id(&self, device_id: &str) -> AppResult<Option<User>>;

    /// Find a user by the subject id of an external identity provider.
    async fn find_user_by_external_id(&self, external_id: &str) -> AppResult<Option<User>>;

    /// Create a user. Duplicate email, device id or external id is a conflict.
    async fn create_user(&self, data: &CreateUser) -> AppResult<User>;

    /// Stamp `last_login_at` with the current time.
    async fn record_login(&self, id: i64) -> AppResult<()>;

    /// Toggle the active flag. `NotFound` if the user does not exist.
    async fn set_user_active(&self, id: i64, is_active: bool) -> AppResult<User>;

    /// Link a user to a tenant, returning the existing link if present.
    async fn link_user_to_tenant(&self, user_id: i64, tenant_id: i64) -> AppResult<UserTenantLink>;

    /// Find the link between a user and a tenant.
    async fn find_user_tenant_link(
        &self,
        user_id: i64,
        tenant_id: i64,
    ) -> AppResult<Option<UserTenantLink>>;

    /// Users linked to a tenant, most recently linked first.
    async fn list_tenant_users(&self, tenant_id: i64) -> AppResult<Vec<User>>;
}

/// Organizations, memberships and invitations.
#[async_trait]
pub trait OrganizationStore: Send + Sync + 'static {
    /// Open a transaction for multi-row writes.
    async fn begin(&self) -> AppResult<Box<dyn OrganizationTx>>;

    /// Find an organization by primary key.
    async fn find_organization(&self, id: i64) -> AppResult<Option<Organization>>;

    /// Organizations of a tenant the user belongs to, with the user's role.
    async fn list_user_organizations(
        &self,
        tenant_id: i64,
        user_id: i64,
    ) -> AppResult<Vec<OrganizationMembership>>;

    /// Organizations of a tenant with member counts, newest first.
    async fn list_tenant_organizations(&self, tenant_id: i64)
    -> AppResult<Vec<OrganizationSummary>>;

    /// Apply a partial update. `NotFound` if the organization does not exist.
    async fn update_organization(
        &self,
        id: i64,
        data: &UpdateOrganization,
    ) -> AppResult<Organization>;

    /// Delete an organization together with its members and invitations.
    async fn delete_organization(&self, id: i64) -> AppResult<bool>;

    /// Find one membership.
    async fn find_member(
        &self,
        organization_id: i64,
        user_id: i64,
    ) -> AppResult<Option<OrganizationMember>>;

    /// All memberships of an organization, oldest first.
    async fn list_members(&self, organization_id: i64) -> AppResult<Vec<OrganizationMember>>;

    /// Persist a new PENDING invitation.
    async fn create_invitation(&self, data: &CreateInvitation)
    -> AppResult<OrganizationInvitation>;

    /// Find an invitation by its opaque token.
    async fn find_invitation_by_token(&self, token: &str)
    -> AppResult<Option<OrganizationInvitation>>;

    /// Find an invitation by id within an organization.
    async fn find_invitation(
        &self,
        organization_id: i64,
        id: i64,
    ) -> AppResult<Option<OrganizationInvitation>>;

    /// All invitations of an organization, newest first.
    async fn list_invitations(&self, organization_id: i64)
    -> AppResult<Vec<OrganizationInvitation>>;

    /// Move a PENDING invitation to `status`.
    ///
    /// Returns `None` when the invitation is missing or no longer PENDING.
    async fn resolve_pending_invitation(
        &self,
        id: i64,
        status: InvitationStatus,
    ) -> AppResult<Option<OrganizationInvitation>>;
}

/// A unit of work over organization rows.
///
/// Writes become visible to other callers only after [`commit`](Self::commit).
#[async_trait]
pub trait OrganizationTx: Send {
    /// Insert an organization. Slug collision within the tenant is a conflict.
    async fn insert_organization(&mut self, data: &CreateOrganization) -> AppResult<Organization>;

    /// Insert a membership. An existing (organization, user) pair is a conflict.
    async fn insert_member(
        &mut self,
        organization_id: i64,
        user_id: i64,
        role: OrgRole,
    ) -> AppResult<OrganizationMember>;

    /// All memberships of an organization, locked until the transaction ends.
    ///
    /// Other transactions touching the same memberships wait until this one
    /// commits or rolls back.
    async fn lock_members(&mut self, organization_id: i64) -> AppResult<Vec<OrganizationMember>>;

    /// Change a member's role. `NotFound` if the membership does not exist.
    async fn update_member_role(
        &mut self,
        organization_id: i64,
        user_id: i64,
        role: OrgRole,
    ) -> AppResult<OrganizationMember>;

    /// Remove a membership. Returns `false` if there was none.
    async fn remove_member(&mut self, organization_id: i64, user_id: i64) -> AppResult<bool>;

    /// Mark a PENDING invitation ACCEPTED. Returns `false` if it was not PENDING.
    async fn accept_invitation(&mut self, id: i64) -> AppResult<bool>;

    /// Make every write in this transaction visible.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard every write in this transaction.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Liveness check of the backing store.
#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    /// Succeeds when the store can serve queries.
    async fn ping(&self) -> AppResult<()>;
}
