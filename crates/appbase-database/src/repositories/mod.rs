//! PostgreSQL implementations of the store traits.

pub mod organization;
pub mod tenant;
pub mod user;

pub use organization::OrganizationRepository;
pub use tenant::TenantRepository;
pub use user::UserRepository;

/// Name of the violated unique constraint, if `err` is a unique violation.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => db_err.constraint(),
        _ => None,
    }
}
