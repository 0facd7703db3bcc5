//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use appbase_core::error::{AppError, ErrorKind};
use appbase_core::result::AppResult;
use appbase_entity::user::model::CreateUser;
use appbase_entity::user::{User, UserTenantLink};

use super::unique_violation;
use crate::store::UserStore;

/// Repository for user accounts and user-tenant links.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    async fn find_user_by_device_id(&self, device_id: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE device_id = $1")
            .bind(device_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by device", e)
            })
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = $1")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by external id", e)
            })
    }

    async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, name, device_id, external_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING *",
        )
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.name)
        .bind(&data.device_id)
        .bind(&data.external_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("users_email_key") => AppError::conflict("Email already registered"),
            Some("users_device_id_key") => AppError::conflict("Device already registered"),
            Some("users_external_id_key") => AppError::conflict("External account already linked"),
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    async fn record_login(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to record login time", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    async fn set_user_active(&self, id: i64, is_active: bool) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user", e))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    async fn link_user_to_tenant(&self, user_id: i64, tenant_id: i64) -> AppResult<UserTenantLink> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        sqlx::query_as::<_, UserTenantLink>(
            "INSERT INTO user_tenants (user_id, tenant_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, tenant_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING *",
        )
        .bind(user_id)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to link user to tenant", e)
        })
    }

    async fn find_user_tenant_link(
        &self,
        user_id: i64,
        tenant_id: i64,
    ) -> AppResult<Option<UserTenantLink>> {
        sqlx::query_as::<_, UserTenantLink>(
            "SELECT * FROM user_tenants WHERE user_id = $1 AND tenant_id = $2",
        )
        .bind(user_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find tenant link", e))
    }

    async fn list_tenant_users(&self, tenant_id: i64) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             JOIN user_tenants ut ON ut.user_id = u.id \
             WHERE ut.tenant_id = $1 \
             ORDER BY ut.enabled_at DESC, u.id DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tenant users", e))
    }
}
