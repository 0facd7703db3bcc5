//! In-memory store using a Tokio mutex, for tests and single-process demos.
//!
//! Transactions take the store lock for their whole lifetime and work on a
//! private copy of the state, so they are serialized and all-or-nothing:
//! [`OrganizationTx::commit`] swaps the copy in, dropping discards it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use appbase_core::AppError;
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

use crate::store::{HealthProbe, OrganizationStore, OrganizationTx, TenantStore, UserStore};

#[derive(Debug, Clone, Default)]
struct State {
    last_id: i64,
    tenants: BTreeMap<i64, Tenant>,
    users: BTreeMap<i64, User>,
    links: Vec<UserTenantLink>,
    organizations: BTreeMap<i64, Organization>,
    members: Vec<OrganizationMember>,
    invitations: BTreeMap<i64, OrganizationInvitation>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn insert_organization(&mut self, data: &CreateOrganization) -> AppResult<Organization> {
        if self
            .organizations
            .values()
            .any(|o| o.tenant_id == data.tenant_id && o.slug == data.slug)
        {
            return Err(AppError::conflict(format!(
                "Organization slug '{}' already exists",
                data.slug
            )));
        }
        let now = Utc::now();
        let organization = Organization {
            id: self.next_id(),
            tenant_id: data.tenant_id,
            name: data.name.clone(),
            slug: data.slug.clone(),
            description: data.description.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.organizations
            .insert(organization.id, organization.clone());
        Ok(organization)
    }

    fn insert_member(
        &mut self,
        organization_id: i64,
        user_id: i64,
        role: OrgRole,
    ) -> AppResult<OrganizationMember> {
        if !self.organizations.contains_key(&organization_id) {
            return Err(AppError::database(format!(
                "Organization {organization_id} does not exist"
            )));
        }
        if self
            .members
            .iter()
            .any(|m| m.organization_id == organization_id && m.user_id == user_id)
        {
            return Err(AppError::conflict(
                "User is already a member of this organization",
            ));
        }
        let now = Utc::now();
        let member = OrganizationMember {
            id: self.next_id(),
            organization_id,
            user_id,
            role,
            joined_at: now,
            updated_at: now,
        };
        self.members.push(member.clone());
        Ok(member)
    }

    fn update_member_role(
        &mut self,
        organization_id: i64,
        user_id: i64,
        role: OrgRole,
    ) -> AppResult<OrganizationMember> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.organization_id == organization_id && m.user_id == user_id)
            .ok_or_else(|| AppError::not_found("Membership not found"))?;
        member.role = role;
        member.updated_at = Utc::now();
        Ok(member.clone())
    }

    fn remove_member(&mut self, organization_id: i64, user_id: i64) -> bool {
        let before = self.members.len();
        self.members
            .retain(|m| !(m.organization_id == organization_id && m.user_id == user_id));
        self.members.len() < before
    }

    fn members_of(&self, organization_id: i64) -> Vec<OrganizationMember> {
        self.members
            .iter()
            .filter(|m| m.organization_id == organization_id)
            .cloned()
            .collect()
    }
}

/// Store keeping every table in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    fail_next_member_insert: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next membership insert inside a transaction fail.
    pub fn fail_next_member_insert(&self) {
        self.fail_next_member_insert.store(true, Ordering::SeqCst);
    }

    /// Number of organizations currently stored.
    pub async fn organization_count(&self) -> usize {
        self.state.lock().await.organizations.len()
    }

    /// Number of memberships currently stored.
    pub async fn member_count(&self) -> usize {
        self.state.lock().await.members.len()
    }
}

#[async_trait]
impl HealthProbe for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn find_tenant(&self, id: i64) -> AppResult<Option<Tenant>> {
        Ok(self.state.lock().await.tenants.get(&id).cloned())
    }

    async fn find_tenant_by_api_key(&self, api_key: &str) -> AppResult<Option<Tenant>> {
        let state = self.state.lock().await;
        Ok(state.tenants.values().find(|t| t.api_key == api_key).cloned())
    }

    async fn list_tenants(&self) -> AppResult<Vec<Tenant>> {
        let state = self.state.lock().await;
        Ok(state.tenants.values().rev().cloned().collect())
    }

    async fn create_tenant(&self, data: &CreateTenant) -> AppResult<Tenant> {
        let mut state = self.state.lock().await;
        if state.tenants.values().any(|t| t.slug == data.slug) {
            return Err(AppError::conflict(format!(
                "Tenant slug '{}' already exists",
                data.slug
            )));
        }
        if state.tenants.values().any(|t| t.api_key == data.api_key) {
            return Err(AppError::conflict("API key already in use"));
        }
        let now = Utc::now();
        let tenant = Tenant {
            id: state.next_id(),
            name: data.name.clone(),
            slug: data.slug.clone(),
            api_key: data.api_key.clone(),
            allowed_origins: data.allowed_origins.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn set_tenant_active(&self, id: i64, is_active: bool) -> AppResult<Tenant> {
        let mut state = self.state.lock().await;
        let tenant = state
            .tenants
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Tenant {id} not found")))?;
        tenant.is_active = is_active;
        tenant.updated_at = Utc::now();
        Ok(tenant.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    async fn find_user_by_device_id(&self, device_id: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.device_id.as_deref() == Some(device_id))
            .cloned())
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.external_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        let mut state = self.state.lock().await;
        for existing in state.users.values() {
            if let (Some(a), Some(b)) = (&existing.email, &data.email) {
                if a.eq_ignore_ascii_case(b) {
                    return Err(AppError::conflict("Email already registered"));
                }
            }
            if existing.device_id.is_some() && existing.device_id == data.device_id {
                return Err(AppError::conflict("Device already registered"));
            }
            if existing.external_id.is_some() && existing.external_id == data.external_id {
                return Err(AppError::conflict("External account already linked"));
            }
        }
        let now = Utc::now();
        let user = User {
            id: state.next_id(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            name: data.name.clone(),
            device_id: data.device_id.clone(),
            external_id: data.external_id.clone(),
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn record_login(&self, id: i64) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.last_login_at = Some(Utc::now());
        Ok(())
    }

    async fn set_user_active(&self, id: i64, is_active: bool) -> AppResult<User> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.is_active = is_active;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn link_user_to_tenant(&self, user_id: i64, tenant_id: i64) -> AppResult<UserTenantLink> {
        let mut state = self.state.lock().await;
        if let Some(link) = state
            .links
            .iter()
            .find(|l| l.user_id == user_id && l.tenant_id == tenant_id)
        {
            return Ok(link.clone());
        }
        let link = UserTenantLink {
            id: state.next_id(),
            user_id,
            tenant_id,
            billing_customer_id: None,
            enabled_at: Utc::now(),
        };
        state.links.push(link.clone());
        Ok(link)
    }

    async fn find_user_tenant_link(
        &self,
        user_id: i64,
        tenant_id: i64,
    ) -> AppResult<Option<UserTenantLink>> {
        let state = self.state.lock().await;
        Ok(state
            .links
            .iter()
            .find(|l| l.user_id == user_id && l.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_tenant_users(&self, tenant_id: i64) -> AppResult<Vec<User>> {
        let state = self.state.lock().await;
        Ok(state
            .links
            .iter()
            .rev()
            .filter(|l| l.tenant_id == tenant_id)
            .filter_map(|l| state.users.get(&l.user_id).cloned())
            .collect())
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn OrganizationTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            working,
            fail_next_member_insert: self.fail_next_member_insert.clone(),
        }))
    }

    async fn find_organization(&self, id: i64) -> AppResult<Option<Organization>> {
        Ok(self.state.lock().await.organizations.get(&id).cloned())
    }

    async fn list_user_organizations(
        &self,
        tenant_id: i64,
        user_id: i64,
    ) -> AppResult<Vec<OrganizationMembership>> {
        let state = self.state.lock().await;
        Ok(state
            .members
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| {
                state
                    .organizations
                    .get(&m.organization_id)
                    .filter(|o| o.tenant_id == tenant_id)
                    .map(|o| OrganizationMembership {
                        organization: o.clone(),
                        role: m.role,
                    })
            })
            .collect())
    }

    async fn list_tenant_organizations(
        &self,
        tenant_id: i64,
    ) -> AppResult<Vec<OrganizationSummary>> {
        let state = self.state.lock().await;
        Ok(state
            .organizations
            .values()
            .rev()
            .filter(|o| o.tenant_id == tenant_id)
            .map(|o| OrganizationSummary {
                organization: o.clone(),
                member_count: state.members_of(o.id).len() as i64,
            })
            .collect())
    }

    async fn update_organization(
        &self,
        id: i64,
        data: &UpdateOrganization,
    ) -> AppResult<Organization> {
        let mut state = self.state.lock().await;
        let organization = state
            .organizations
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Organization {id} not found")))?;
        if let Some(name) = &data.name {
            organization.name = name.clone();
        }
        if let Some(description) = &data.description {
            organization.description = Some(description.clone());
        }
        if let Some(is_active) = data.is_active {
            organization.is_active = is_active;
        }
        organization.updated_at = Utc::now();
        Ok(organization.clone())
    }

    async fn delete_organization(&self, id: i64) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.organizations.remove(&id).is_none() {
            return Ok(false);
        }
        state.members.retain(|m| m.organization_id != id);
        state.invitations.retain(|_, i| i.organization_id != id);
        Ok(true)
    }

    async fn find_member(
        &self,
        organization_id: i64,
        user_id: i64,
    ) -> AppResult<Option<OrganizationMember>> {
        let state = self.state.lock().await;
        Ok(state
            .members
            .iter()
            .find(|m| m.organization_id == organization_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_members(&self, organization_id: i64) -> AppResult<Vec<OrganizationMember>> {
        Ok(self.state.lock().await.members_of(organization_id))
    }

    async fn create_invitation(
        &self,
        data: &CreateInvitation,
    ) -> AppResult<OrganizationInvitation> {
        let mut state = self.state.lock().await;
        if state.invitations.values().any(|i| i.token == data.token) {
            return Err(AppError::conflict("Invitation token collision"));
        }
        let invitation = OrganizationInvitation {
            id: state.next_id(),
            organization_id: data.organization_id,
            invited_by: data.invited_by,
            email: data.email.clone(),
            role: data.role,
            token: data.token.clone(),
            status: InvitationStatus::Pending,
            created_at: Utc::now(),
            expires_at: data.expires_at,
            accepted_at: None,
        };
        state.invitations.insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    async fn find_invitation_by_token(
        &self,
        token: &str,
    ) -> AppResult<Option<OrganizationInvitation>> {
        let state = self.state.lock().await;
        Ok(state.invitations.values().find(|i| i.token == token).cloned())
    }

    async fn find_invitation(
        &self,
        organization_id: i64,
        id: i64,
    ) -> AppResult<Option<OrganizationInvitation>> {
        let state = self.state.lock().await;
        Ok(state
            .invitations
            .get(&id)
            .filter(|i| i.organization_id == organization_id)
            .cloned())
    }

    async fn list_invitations(
        &self,
        organization_id: i64,
    ) -> AppResult<Vec<OrganizationInvitation>> {
        let state = self.state.lock().await;
        Ok(state
            .invitations
            .values()
            .rev()
            .filter(|i| i.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn resolve_pending_invitation(
        &self,
        id: i64,
        status: InvitationStatus,
    ) -> AppResult<Option<OrganizationInvitation>> {
        if !InvitationStatus::Pending.can_transition_to(status) {
            return Err(AppError::internal(format!("Invitation cannot move to {status}")));
        }
        let mut state = self.state.lock().await;
        Ok(state
            .invitations
            .get_mut(&id)
            .filter(|i| i.status.can_transition_to(status))
            .map(|i| {
                i.status = status;
                i.clone()
            }))
    }
}

/// Transaction over a private copy of the store state.
struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    working: State,
    fail_next_member_insert: Arc<AtomicBool>,
}

#[async_trait]
impl OrganizationTx for MemoryTx {
    async fn insert_organization(&mut self, data: &CreateOrganization) -> AppResult<Organization> {
        self.working.insert_organization(data)
    }

    async fn insert_member(
        &mut self,
        organization_id: i64,
        user_id: i64,
        role: OrgRole,
    ) -> AppResult<OrganizationMember> {
        if self.fail_next_member_insert.swap(false, Ordering::SeqCst) {
            return Err(AppError::database("Injected membership insert failure"));
        }
        self.working.insert_member(organization_id, user_id, role)
    }

    async fn lock_members(&mut self, organization_id: i64) -> AppResult<Vec<OrganizationMember>> {
        Ok(self.working.members_of(organization_id))
    }

    async fn update_member_role(
        &mut self,
        organization_id: i64,
        user_id: i64,
        role: OrgRole,
    ) -> AppResult<OrganizationMember> {
        self.working.update_member_role(organization_id, user_id, role)
    }

    async fn remove_member(&mut self, organization_id: i64, user_id: i64) -> AppResult<bool> {
        Ok(self.working.remove_member(organization_id, user_id))
    }

    async fn accept_invitation(&mut self, id: i64) -> AppResult<bool> {
        match self.working.invitations.get_mut(&id) {
            Some(invitation) if invitation.status.can_transition_to(InvitationStatus::Accepted) => {
                invitation.status = InvitationStatus::Accepted;
                invitation.accepted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTx {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, Tenant, User) {
        let store = MemoryStore::new();
        let tenant = store
            .create_tenant(&CreateTenant {
                name: "Demo".into(),
                slug: "demo".into(),
                api_key: "key-demo".into(),
                allowed_origins: vec![],
            })
            .await
            .unwrap();
        let user = store
            .create_user(&CreateUser {
                email: Some("owner@example.com".into()),
                device_id: Some("dev-owner".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        (store, tenant, user)
    }

    fn new_org(tenant_id: i64, slug: &str) -> CreateOrganization {
        CreateOrganization {
            tenant_id,
            name: "Acme".into(),
            slug: slug.into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let (store, tenant, user) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        let org = tx.insert_organization(&new_org(tenant.id, "acme")).await.unwrap();
        tx.insert_member(org.id, user.id, OrgRole::Owner).await.unwrap();
        tx.commit().await.unwrap();

        assert!(store.find_organization(org.id).await.unwrap().is_some());
        let member = store.find_member(org.id, user.id).await.unwrap().unwrap();
        assert_eq!(member.role, OrgRole::Owner);
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let (store, tenant, _) = seeded().await;
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_organization(&new_org(tenant.id, "acme")).await.unwrap();
        }
        assert_eq!(store.organization_count().await, 0);
    }

    #[tokio::test]
    async fn test_injected_member_failure_fires_once() {
        let (store, tenant, user) = seeded().await;
        store.fail_next_member_insert();

        let mut tx = store.begin().await.unwrap();
        let org = tx.insert_organization(&new_org(tenant.id, "acme")).await.unwrap();
        assert!(tx.insert_member(org.id, user.id, OrgRole::Owner).await.is_err());
        tx.rollback().await.unwrap();
        assert_eq!(store.organization_count().await, 0);

        let mut tx = store.begin().await.unwrap();
        let org = tx.insert_organization(&new_org(tenant.id, "acme")).await.unwrap();
        tx.insert_member(org.id, user.id, OrgRole::Owner).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.member_count().await, 1);
    }

    #[tokio::test]
    async fn test_slug_unique_per_tenant() {
        let (store, tenant, _) = seeded().await;
        let other = store
            .create_tenant(&CreateTenant {
                name: "Other".into(),
                slug: "other".into(),
                api_key: "key-other".into(),
                allowed_origins: vec![],
            })
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.insert_organization(&new_org(tenant.id, "acme")).await.unwrap();
        let err = tx
            .insert_organization(&new_org(tenant.id, "acme"))
            .await
            .unwrap_err();
        assert!(err.is(appbase_core::error::ErrorKind::Conflict));
        tx.insert_organization(&new_org(other.id, "acme")).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.organization_count().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_case_insensitive() {
        let (store, _, _) = seeded().await;
        let err = store
            .create_user(&CreateUser {
                email: Some("OWNER@example.com".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is(appbase_core::error::ErrorKind::Conflict));
        assert!(
            store
                .find_user_by_email("Owner@Example.com")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_tenant_link_is_idempotent() {
        let (store, tenant, user) = seeded().await;
        let first = store.link_user_to_tenant(user.id, tenant.id).await.unwrap();
        let second = store.link_user_to_tenant(user.id, tenant.id).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_resolve_pending_only_once() {
        let (store, tenant, user) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        let org = tx.insert_organization(&new_org(tenant.id, "acme")).await.unwrap();
        tx.commit().await.unwrap();

        let invitation = store
            .create_invitation(&CreateInvitation {
                organization_id: org.id,
                invited_by: user.id,
                email: "new@example.com".into(),
                role: OrgRole::Member,
                token: "tok".into(),
                expires_at: Utc::now() + chrono::Duration::days(7),
            })
            .await
            .unwrap();

        let revoked = store
            .resolve_pending_invitation(invitation.id, InvitationStatus::Revoked)
            .await
            .unwrap();
        assert_eq!(revoked.unwrap().status, InvitationStatus::Revoked);
        assert!(
            store
                .resolve_pending_invitation(invitation.id, InvitationStatus::Expired)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_find_user_by_external_id() {
        let (store, _, _) = seeded().await;
        let linked = store
            .create_user(&CreateUser {
                external_id: Some("google-sub-1".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let found = store
            .find_user_by_external_id("google-sub-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, linked.id);
        assert!(found.email.is_none() && found.device_id.is_none());
        assert!(store.find_user_by_external_id("google-sub-2").await.unwrap().is_none());

        let err = store
            .create_user(&CreateUser {
                external_id: Some("google-sub-1".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is(appbase_core::error::ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_tenant_users_and_organization_counts() {
        let (store, tenant, user) = seeded().await;
        let other = store
            .create_user(&CreateUser {
                device_id: Some("dev-other".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        store.link_user_to_tenant(user.id, tenant.id).await.unwrap();
        store.link_user_to_tenant(other.id, tenant.id).await.unwrap();

        let users = store.list_tenant_users(tenant.id).await.unwrap();
        assert_eq!(
            users.iter().map(|u| u.id).collect::<Vec<_>>(),
            vec![other.id, user.id]
        );
        assert!(store.list_tenant_users(tenant.id + 100).await.unwrap().is_empty());

        let mut tx = store.begin().await.unwrap();
        let org = tx.insert_organization(&new_org(tenant.id, "acme")).await.unwrap();
        tx.insert_member(org.id, user.id, OrgRole::Owner).await.unwrap();
        tx.insert_member(org.id, other.id, OrgRole::Member).await.unwrap();
        tx.insert_organization(&new_org(tenant.id, "empty")).await.unwrap();
        tx.commit().await.unwrap();

        let summaries = store.list_tenant_organizations(tenant.id).await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].organization.slug, "empty");
        assert_eq!(summaries[0].member_count, 0);
        assert_eq!(summaries[1].member_count, 2);
    }

    #[tokio::test]
    async fn test_member_writes_wait_for_commit() {
        let (store, tenant, user) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        let org = tx.insert_organization(&new_org(tenant.id, "acme")).await.unwrap();
        tx.insert_member(org.id, user.id, OrgRole::Owner).await.unwrap();
        tx.commit().await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            assert_eq!(tx.lock_members(org.id).await.unwrap().len(), 1);
            tx.update_member_role(org.id, user.id, OrgRole::Member)
                .await
                .unwrap();
            assert!(tx.remove_member(org.id, user.id).await.unwrap());
        }
        let member = store.find_member(org.id, user.id).await.unwrap().unwrap();
        assert_eq!(member.role, OrgRole::Owner);

        let mut tx = store.begin().await.unwrap();
        tx.update_member_role(org.id, user.id, OrgRole::Admin)
            .await
            .unwrap();
        let err = tx
            .update_member_role(org.id, user.id + 100, OrgRole::Admin)
            .await
            .unwrap_err();
        assert!(err.is(appbase_core::error::ErrorKind::NotFound));
        tx.commit().await.unwrap();
        let member = store.find_member(org.id, user.id).await.unwrap().unwrap();
        assert_eq!(member.role, OrgRole::Admin);
    }

    #[tokio::test]
    async fn test_resolve_rejects_pending_as_target() {
        let (store, _, _) = seeded().await;
        let err = store
            .resolve_pending_invitation(1, InvitationStatus::Pending)
            .await
            .unwrap_err();
        assert!(err.is(appbase_core::error::ErrorKind::Internal));
    }
}
