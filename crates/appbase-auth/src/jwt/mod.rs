//! Signed session tokens.

pub mod claims;
pub mod codec;

pub use claims::{AdminClaims, TokenClaims, TokenKind, UserClaims};
pub use codec::{TokenCodec, TokenError};
