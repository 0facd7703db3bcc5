//! # appbase-core
//!
//! Core crate for Appbase. Contains the configuration schemas loaded once at
//! startup and the unified error system shared by every other crate.
//!
//! This crate has **no** internal dependencies on other Appbase crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
