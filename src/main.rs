//! Appbase Server: multi-tenant auth and organization backend.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use appbase_api::app::run_server;
use appbase_api::state::{AppState, Stores};
use appbase_auth::identity::GoogleIdentityVerifier;
use appbase_core::config::AppConfig;
use appbase_core::error::AppError;
use appbase_database::DatabasePool;
use appbase_database::migration::run_migrations;
use appbase_database::repositories::organization::OrganizationRepository;
use appbase_database::repositories::tenant::TenantRepository;
use appbase_database::repositories::user::UserRepository;

#[tokio::main]
async fn main() {
    let env = std::env::var("APPBASE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(environment = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Appbase v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    run_migrations(&db).await?;

    // ── Step 2: Repositories ─────────────────────────────────────
    let stores = Stores {
        tenants: Arc::new(TenantRepository::new(db.pool().clone())),
        users: Arc::new(UserRepository::new(db.pool().clone())),
        organizations: Arc::new(OrganizationRepository::new(db.pool().clone())),
        health: Arc::new(db.clone()),
    };

    // ── Step 3: External identity provider ───────────────────────
    if config.admin.allowed_emails.is_empty() {
        tracing::warn!("admin.allowed_emails is empty; nobody can sign in to the console");
    }
    let verifier = Arc::new(GoogleIdentityVerifier::new(&config.admin)?);

    // ── Step 4: Serve ────────────────────────────────────────────
    let state = AppState::new(config, stores, verifier);
    let result = run_server(state).await;

    db.close().await;
    result
}
