//! # appbase-auth
//!
//! Credential handling for Appbase.
//!
//! ## Modules
//!
//! - `jwt`: signed session token claims and the HS256 codec
//! - `tenant`: API-key to tenant resolution
//! - `session`: end-user access/refresh token authority
//! - `admin`: admin console session authority and allowlist
//! - `identity`: external identity provider verification
//! - `password`: Argon2id password hashing and policy

pub mod admin;
pub mod identity;
pub mod jwt;
pub mod password;
pub mod session;
pub mod tenant;

pub use admin::{AdminIdentity, AdminSessionAuthority};
pub use identity::{ExternalIdentity, GoogleIdentityVerifier, IdentityVerifier};
pub use jwt::{AdminClaims, TokenCodec, TokenError, TokenKind, UserClaims};
pub use password::PasswordHasher;
pub use session::{SessionAuthority, TokenPair};
pub use tenant::TenantResolver;
