//! Tenant ("app") entities.

pub mod model;

pub use model::Tenant;
