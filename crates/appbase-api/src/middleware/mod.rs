//! Axum middleware stack.
//!
//! Every protected route sits behind exactly one of the gates below. Each
//! gate attaches its principal to the request extensions for the
//! extractors in [`crate::extractors`].

pub mod admin;
pub mod auth;
pub mod cors;
pub mod logging;
pub mod tenant;

pub use admin::require_admin;
pub use auth::{optional_user, require_user};
pub use tenant::require_tenant;
