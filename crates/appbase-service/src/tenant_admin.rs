//! Tenant administration for the admin console.

use std::sync::Arc;

use tracing::info;

use appbase_auth::session::{SessionAuthority, TokenPair};
use appbase_core::AppError;
use appbase_core::result::AppResult;
use appbase_database::store::{OrganizationStore, TenantStore, UserStore};
use appbase_entity::organization::OrganizationSummary;
use appbase_entity::tenant::Tenant;
use appbase_entity::user::User;

use crate::context::AdminContext;

/// Lists tenants and what they own, toggles their active flag and mints
/// end-user sessions for support.
#[derive(Clone)]
pub struct TenantAdminService {
    tenants: Arc<dyn TenantStore>,
    users: Arc<dyn UserStore>,
    organizations: Arc<dyn OrganizationStore>,
    sessions: Arc<SessionAuthority>,
}

impl TenantAdminService {
    /// Create the service.
    pub fn new(
        tenants: Arc<dyn TenantStore>,
        users: Arc<dyn UserStore>,
        organizations: Arc<dyn OrganizationStore>,
        sessions: Arc<SessionAuthority>,
    ) -> Self {
        Self {
            tenants,
            users,
            organizations,
            sessions,
        }
    }

    /// All tenants, newest first.
    pub async fn list(&self) -> AppResult<Vec<Tenant>> {
        self.tenants.list_tenants().await
    }

    /// One tenant by id.
    pub async fn get(&self, id: i64) -> AppResult<Tenant> {
        self.tenants
            .find_tenant(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("App {id} not found")))
    }

    /// Activate or deactivate a tenant. Takes effect on the next request.
    pub async fn set_active(
        &self,
        admin: &AdminContext,
        id: i64,
        is_active: bool,
    ) -> AppResult<Tenant> {
        let tenant = self.tenants.set_tenant_active(id, is_active).await?;
        info!(
            tenant_id = id,
            is_active,
            admin = %admin.email,
            "Tenant status changed"
        );
        Ok(tenant)
    }

    /// Users linked to the tenant, most recently linked first.
    pub async fn list_users(&self, id: i64) -> AppResult<Vec<User>> {
        let tenant = self.get(id).await?;
        self.users.list_tenant_users(tenant.id).await
    }

    /// Organizations of the tenant with their member counts.
    pub async fn list_organizations(&self, id: i64) -> AppResult<Vec<OrganizationSummary>> {
        let tenant = self.get(id).await?;
        self.organizations.list_tenant_organizations(tenant.id).await
    }

    /// Issue an unscoped token pair for one of the tenant's users.
    ///
    /// The user must exist and be linked to the tenant. Disabled users and
    /// tenants are still issued tokens; the gates reject them on use.
    pub async fn issue_tokens(
        &self,
        admin: &AdminContext,
        id: i64,
        user_id: i64,
    ) -> AppResult<TokenPair> {
        let tenant = self.get(id).await?;
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        if self
            .users
            .find_user_tenant_link(user.id, tenant.id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found(format!(
                "User {user_id} not found in app {id}"
            )));
        }

        let tokens = self.sessions.issue_pair(user.id, tenant.id, None)?;
        info!(
            tenant_id = tenant.id,
            user_id = user.id,
            admin = %admin.email,
            "Admin issued user tokens"
        );
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appbase_core::config::AuthConfig;
    use appbase_core::error::ErrorKind;
    use appbase_database::MemoryStore;
    use appbase_entity::organization::OrgRole;
    use appbase_entity::organization::model::CreateOrganization;
    use appbase_entity::tenant::model::CreateTenant;
    use appbase_entity::user::model::CreateUser;

    fn admin() -> AdminContext {
        AdminContext {
            email: "root@example.com".into(),
            name: "Root".into(),
        }
    }

    async fn setup() -> (MemoryStore, TenantAdminService, Arc<SessionAuthority>, Tenant) {
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
        let config = AuthConfig {
            jwt_secret: "tenant-admin-secret".into(),
            ..AuthConfig::default()
        };
        let sessions = Arc::new(SessionAuthority::new(
            &config,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        ));
        let service = TenantAdminService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            sessions.clone(),
        );
        (store, service, sessions, tenant)
    }

    #[tokio::test]
    async fn test_toggle_and_missing() {
        let (_, service, _, tenant) = setup().await;

        let updated = service.set_active(&admin(), tenant.id, false).await.unwrap();
        assert!(!updated.is_active);
        assert!(!service.get(tenant.id).await.unwrap().is_active);
        assert_eq!(service.list().await.unwrap().len(), 1);

        let err = service.get(tenant.id + 1).await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
        let err = service.list_users(tenant.id + 1).await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_users_and_organizations_of_a_tenant() {
        let (store, service, _, tenant) = setup().await;
        let linked = store
            .create_user(&CreateUser {
                device_id: Some("dev-1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .create_user(&CreateUser {
                device_id: Some("dev-2".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        store.link_user_to_tenant(linked.id, tenant.id).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let org = tx
            .insert_organization(&CreateOrganization {
                tenant_id: tenant.id,
                name: "Acme".into(),
                slug: "acme".into(),
                description: None,
            })
            .await
            .unwrap();
        tx.insert_member(org.id, linked.id, OrgRole::Owner).await.unwrap();
        tx.commit().await.unwrap();

        let users = service.list_users(tenant.id).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, linked.id);

        let organizations = service.list_organizations(tenant.id).await.unwrap();
        assert_eq!(organizations.len(), 1);
        assert_eq!(organizations[0].organization.id, org.id);
        assert_eq!(organizations[0].member_count, 1);
    }

    #[tokio::test]
    async fn test_issue_tokens_requires_a_linked_user() {
        let (store, service, sessions, tenant) = setup().await;
        let user = store
            .create_user(&CreateUser {
                device_id: Some("dev-1".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let err = service
            .issue_tokens(&admin(), tenant.id, user.id)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
        let err = service
            .issue_tokens(&admin(), tenant.id, user.id + 100)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));

        store.link_user_to_tenant(user.id, tenant.id).await.unwrap();
        let pair = service
            .issue_tokens(&admin(), tenant.id, user.id)
            .await
            .unwrap();
        let claims = sessions.validate_access(&pair.access_token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.app_id, tenant.id);
        assert_eq!(claims.org_role(), None);
        assert!(sessions.validate_refresh(&pair.refresh_token).is_ok());
    }
}
