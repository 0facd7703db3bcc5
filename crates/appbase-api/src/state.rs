//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use appbase_auth::admin::AdminSessionAuthority;
use appbase_auth::identity::IdentityVerifier;
use appbase_auth::password::PasswordHasher;
use appbase_auth::session::SessionAuthority;
use appbase_auth::tenant::TenantResolver;
use appbase_core::config::AppConfig;
use appbase_database::store::{HealthProbe, OrganizationStore, TenantStore, UserStore};
use appbase_service::account::AccountService;
use appbase_service::organization::OrganizationService;
use appbase_service::tenant_admin::TenantAdminService;

/// Store handles the state is built from.
///
/// Production wires the PostgreSQL repositories; tests wire one
/// `MemoryStore` into every slot.
#[derive(Clone)]
pub struct Stores {
    /// Tenant lookups.
    pub tenants: Arc<dyn TenantStore>,
    /// End-user lookups and writes.
    pub users: Arc<dyn UserStore>,
    /// Organizations, memberships, invitations.
    pub organizations: Arc<dyn OrganizationStore>,
    /// Liveness check for `/health`.
    pub health: Arc<dyn HealthProbe>,
}

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// API key to tenant resolution
    pub tenant_resolver: Arc<TenantResolver>,
    /// End-user token issuing and validation
    pub sessions: Arc<SessionAuthority>,
    /// Admin console sessions
    pub admin_sessions: Arc<AdminSessionAuthority>,

    // ── Stores ───────────────────────────────────────────────
    /// User store, read by the authorization gates
    pub users: Arc<dyn UserStore>,
    /// Database liveness check
    pub health: Arc<dyn HealthProbe>,

    // ── Services ─────────────────────────────────────────────
    /// Signup, login, device login, refresh
    pub account_service: Arc<AccountService>,
    /// Organization membership engine
    pub organization_service: Arc<OrganizationService>,
    /// Tenant listing, activation and support tooling
    pub tenant_admin_service: Arc<TenantAdminService>,
}

impl AppState {
    /// Wire every authority and service from configuration and stores.
    pub fn new(config: AppConfig, stores: Stores, verifier: Arc<dyn IdentityVerifier>) -> Self {
        let sessions = Arc::new(SessionAuthority::new(
            &config.auth,
            Arc::clone(&stores.users),
            Arc::clone(&stores.organizations),
        ));
        let admin_sessions = Arc::new(AdminSessionAuthority::new(
            &config.auth,
            &config.admin,
            verifier,
        ));
        let account_service = Arc::new(AccountService::new(
            Arc::clone(&stores.users),
            Arc::clone(&stores.organizations),
            Arc::clone(&sessions),
            PasswordHasher::new(&config.auth),
        ));
        let organization_service = Arc::new(OrganizationService::new(
            Arc::clone(&stores.organizations),
            &config.organization,
        ));
        let tenant_admin_service = Arc::new(TenantAdminService::new(
            Arc::clone(&stores.tenants),
            Arc::clone(&stores.users),
            Arc::clone(&stores.organizations),
            Arc::clone(&sessions),
        ));

        Self {
            tenant_resolver: Arc::new(TenantResolver::new(Arc::clone(&stores.tenants))),
            tenant_admin_service,
            sessions,
            admin_sessions,
            users: stores.users,
            health: stores.health,
            account_service,
            organization_service,
            config: Arc::new(config),
        }
    }
}
