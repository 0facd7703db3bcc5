//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! layered TOML files and `APPBASE__`-prefixed environment variables. The
//! resulting [`AppConfig`] is built once at startup and shared immutably.

pub mod admin;
pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod organization;

use serde::{Deserialize, Serialize};

pub use self::admin::AdminConfig;
pub use self::app::{CorsConfig, Environment, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::organization::OrganizationConfig;

use crate::error::AppError;

/// Placeholder secret shipped in defaults; refused in production.
pub const PLACEHOLDER_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// End-user token settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Operator console settings.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Organization and invitation settings.
    #[serde(default)]
    pub organization: OrganizationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files and the environment.
    ///
    /// Merges `config/default.toml`, an environment-specific overlay
    /// `config/{env}.toml`, and environment variables prefixed with
    /// `APPBASE__` (e.g. `APPBASE__AUTH__JWT_SECRET`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("APPBASE")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("admin.allowed_emails")
                    .with_list_parse_key("server.cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot run safely.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if self.server.is_production() && self.auth.jwt_secret == PLACEHOLDER_JWT_SECRET {
            return Err(AppError::configuration(
                "auth.jwt_secret must be set in production",
            ));
        }
        if self.auth.access_token_ttl_minutes == 0 || self.auth.refresh_token_ttl_days == 0 {
            return Err(AppError::configuration("token lifetimes must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig::new("postgres://localhost/appbase"),
            auth: AuthConfig::default(),
            admin: AdminConfig::default(),
            organization: OrganizationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_defaults_validate_outside_production() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_placeholder_secret_rejected_in_production() {
        let mut config = sample();
        config.server.environment = Environment::Production;
        assert!(config.validate().is_err());

        config.auth.jwt_secret = "a-real-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut config = sample();
        config.auth.jwt_secret = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
