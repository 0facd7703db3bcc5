//! # appbase-api
//!
//! HTTP API layer for Appbase built on Axum.
//!
//! Provides the REST endpoints, the four authorization gates (tenant only,
//! tenant plus required user, tenant plus optional user, admin only),
//! extractors, DTOs, and the error envelope.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
