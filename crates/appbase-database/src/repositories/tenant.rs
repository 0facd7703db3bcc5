//! Tenant repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use appbase_core::error::{AppError, ErrorKind};
use appbase_core::result::AppResult;
use appbase_entity::tenant::Tenant;
use appbase_entity::tenant::model::CreateTenant;

use super::unique_violation;
use crate::store::TenantStore;

/// Repository for tenant lookups and activation changes.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    /// Create a new tenant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for TenantRepository {
    async fn find_tenant(&self, id: i64) -> AppResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find tenant", e))
    }

    async fn find_tenant_by_api_key(&self, api_key: &str) -> AppResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE api_key = $1")
            .bind(api_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find tenant by API key", e)
            })
    }

    async fn list_tenants(&self) -> AppResult<Vec<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tenants", e))
    }

    async fn create_tenant(&self, data: &CreateTenant) -> AppResult<Tenant> {
        sqlx::query_as::<_, Tenant>(
            "INSERT INTO tenants (name, slug, api_key, allowed_origins) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.slug)
        .bind(&data.api_key)
        .bind(&data.allowed_origins)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("tenants_slug_key") => {
                AppError::conflict(format!("Tenant slug '{}' already exists", data.slug))
            }
            Some("tenants_api_key_key") => AppError::conflict("API key already in use"),
            _ => AppError::with_source(ErrorKind::Database, "Failed to create tenant", e),
        })
    }

    async fn set_tenant_active(&self, id: i64, is_active: bool) -> AppResult<Tenant> {
        sqlx::query_as::<_, Tenant>(
            "UPDATE tenants SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update tenant", e))?
        .ok_or_else(|| AppError::not_found(format!("Tenant {id} not found")))
    }
}
