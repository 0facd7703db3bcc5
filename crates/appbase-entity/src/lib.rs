//! # appbase-entity
//!
//! Domain entity models for Appbase. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`; enums map onto PostgreSQL enum types.

pub mod organization;
pub mod tenant;
pub mod user;
