//! Custom Axum extractors.

pub mod context;

pub use context::{AdminSession, AppContext};
