//! # appbase-database
//!
//! PostgreSQL connection management, the store traits the rest of Appbase
//! programs against, their sqlx repository implementations, and an
//! in-memory store with the same transactional contract.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{HealthProbe, OrganizationStore, OrganizationTx, TenantStore, UserStore};
