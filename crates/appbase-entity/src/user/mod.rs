//! User domain entities.

pub mod link;
pub mod model;

pub use link::UserTenantLink;
pub use model::User;
