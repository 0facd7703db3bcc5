//! Organization membership engine.

pub mod invitation;
pub mod service;

pub use service::OrganizationService;
