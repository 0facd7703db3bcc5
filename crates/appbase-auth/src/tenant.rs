//! API-key to tenant resolution.

use std::sync::Arc;

use tracing::debug;

use appbase_core::AppError;
use appbase_core::result::AppResult;
use appbase_database::store::TenantStore;
use appbase_entity::tenant::Tenant;

/// Maps an `X-API-Key` value to its tenant.
#[derive(Clone)]
pub struct TenantResolver {
    tenants: Arc<dyn TenantStore>,
}

impl std::fmt::Debug for TenantResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantResolver").finish_non_exhaustive()
    }
}

impl TenantResolver {
    /// Create a resolver over the given tenant store.
    pub fn new(tenants: Arc<dyn TenantStore>) -> Self {
        Self { tenants }
    }

    /// Resolve the key to its tenant by exact match.
    ///
    /// A missing or unknown key is `Unauthorized`. Inactive tenants are
    /// returned as-is; the request gate owns the active check.
    pub async fn resolve(&self, api_key: Option<&str>) -> AppResult<Tenant> {
        let api_key = match api_key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(AppError::unauthorized("API key required")),
        };

        self.tenants
            .find_tenant_by_api_key(api_key)
            .await?
            .ok_or_else(|| {
                debug!("Rejected unknown API key");
                AppError::unauthorized("Invalid API key")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appbase_core::error::ErrorKind;
    use appbase_database::MemoryStore;
    use appbase_entity::tenant::model::CreateTenant;

    async fn setup() -> (MemoryStore, TenantResolver, Tenant) {
        let store = MemoryStore::new();
        let tenant = store
            .create_tenant(&CreateTenant {
                name: "Demo".into(),
                slug: "demo".into(),
                api_key: "key-abc".into(),
                allowed_origins: vec![],
            })
            .await
            .unwrap();
        let resolver = TenantResolver::new(Arc::new(store.clone()));
        (store, resolver, tenant)
    }

    #[tokio::test]
    async fn test_resolves_active_tenant() {
        let (_, resolver, tenant) = setup().await;
        let resolved = resolver.resolve(Some("key-abc")).await.unwrap();
        assert_eq!(resolved.id, tenant.id);
    }

    #[tokio::test]
    async fn test_missing_and_unknown_keys_are_unauthorized() {
        let (_, resolver, _) = setup().await;
        for key in [None, Some(""), Some("key-nope"), Some(" key-abc")] {
            let err = resolver.resolve(key).await.unwrap_err();
            assert!(err.is(ErrorKind::Unauthorized));
        }
    }

    #[tokio::test]
    async fn test_inactive_tenant_is_still_resolved() {
        let (store, resolver, tenant) = setup().await;
        store.set_tenant_active(tenant.id, false).await.unwrap();
        let resolved = resolver.resolve(Some("key-abc")).await.unwrap();
        assert!(!resolved.is_active);
    }
}
