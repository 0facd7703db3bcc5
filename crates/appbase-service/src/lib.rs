//! # appbase-service
//!
//! Business logic for Appbase. Services receive their stores and
//! authorities at construction time as `Arc` references and are shared
//! by every request.

pub mod account;
pub mod context;
pub mod organization;
pub mod tenant_admin;

pub use account::{AccountService, AuthOutcome};
pub use context::{AdminContext, AuthenticatedContext};
pub use organization::OrganizationService;
pub use tenant_admin::TenantAdminService;
