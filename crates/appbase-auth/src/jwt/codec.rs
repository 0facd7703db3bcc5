//! HS256 token signing and validation.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use appbase_core::error::{AppError, ErrorKind};

use super::claims::{TokenClaims, TokenKind};

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// `exp` is in the past.
    #[error("token has expired")]
    Expired,
    /// The token or its claims could not be decoded.
    #[error("token is malformed")]
    Malformed,
    /// Signature mismatch, or a signing algorithm other than HS256.
    #[error("token signature is invalid")]
    BadSignature,
    /// The `type` claim is not the kind expected here.
    #[error("token kind is not accepted here")]
    WrongKind,
    /// Signing failed.
    #[error("token could not be signed")]
    Encoding,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding => AppError::with_source(ErrorKind::Internal, "Failed to sign token", err),
            _ => AppError::with_source(ErrorKind::InvalidCredential, err.to_string(), err),
        }
    }
}

/// Signs and validates session tokens with a shared secret.
///
/// Only HS256 is accepted. Expiry is checked with no leeway: a token is
/// valid while `now <= exp`.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

impl TokenCodec {
    /// Create a codec for the given secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Stamp `iat = now`, `exp = now + ttl` on the claims and sign them.
    pub fn issue<C: TokenClaims>(&self, mut claims: C, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(ttl.as_secs()).map_err(|_| TokenError::Encoding)?;
        claims.set_lifetime(now, now.saturating_add(ttl));
        self.sign(&claims)
    }

    /// Sign already-stamped claims.
    pub fn sign<C: TokenClaims>(&self, claims: &C) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|_| TokenError::Encoding)
    }

    /// Verify signature and expiry, then require the `type` claim to be `expected`.
    pub fn validate<C: TokenClaims>(&self, token: &str, expected: TokenKind) -> Result<C, TokenError> {
        let data = decode::<serde_json::Value>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
                    TokenError::BadSignature
                }
                _ => TokenError::Malformed,
            })?;

        match data.claims.get("type").and_then(|v| v.as_str()) {
            Some(kind) if kind == expected.as_str() => {}
            Some(_) => return Err(TokenError::WrongKind),
            None => return Err(TokenError::Malformed),
        }

        deserialize_claims(data.claims)
    }
}

fn deserialize_claims<C: DeserializeOwned>(value: serde_json::Value) -> Result<C, TokenError> {
    serde_json::from_value(value).map_err(|_| TokenError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::claims::{AdminClaims, UserClaims};
    use appbase_entity::organization::OrgRole;

    const SECRET: &str = "test-secret";
    const TTL: Duration = Duration::from_secs(60);

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET)
    }

    #[test]
    fn test_round_trip_preserves_claims() {
        let codec = codec();
        let claims = UserClaims::new(TokenKind::Access, 42, 7, 3, Some(OrgRole::Owner));
        let token = codec.issue(claims.clone(), TTL).unwrap();
        let decoded: UserClaims = codec.validate(&token, TokenKind::Access).unwrap();

        assert_eq!(decoded.user_id, 42);
        assert_eq!(decoded.app_id, 7);
        assert_eq!(decoded.org_id, 3);
        assert_eq!(decoded.org_role(), Some(OrgRole::Owner));
        assert_eq!(decoded.exp - decoded.iat, 60);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let codec = codec();
        let mut claims = UserClaims::new(TokenKind::Access, 1, 1, 0, None);
        let now = Utc::now().timestamp();
        claims.set_lifetime(now - 120, now - 60);
        let token = codec.sign(&claims).unwrap();

        let err = codec.validate::<UserClaims>(&token, TokenKind::Access).unwrap_err();
        assert_eq!(err, TokenError::Expired);
    }

    #[test]
    fn test_kind_isolation() {
        let codec = codec();
        let refresh = codec
            .issue(UserClaims::new(TokenKind::Refresh, 1, 1, 0, None), TTL)
            .unwrap();
        let access = codec
            .issue(UserClaims::new(TokenKind::Access, 1, 1, 0, None), TTL)
            .unwrap();

        assert_eq!(
            codec.validate::<UserClaims>(&refresh, TokenKind::Access).unwrap_err(),
            TokenError::WrongKind
        );
        assert_eq!(
            codec.validate::<UserClaims>(&access, TokenKind::Refresh).unwrap_err(),
            TokenError::WrongKind
        );
    }

    #[test]
    fn test_admin_and_user_tokens_do_not_cross() {
        let codec = codec();
        let admin = codec.issue(AdminClaims::new("a@example.com", "A"), TTL).unwrap();
        let access = codec
            .issue(UserClaims::new(TokenKind::Access, 1, 1, 0, None), TTL)
            .unwrap();

        assert_eq!(
            codec.validate::<UserClaims>(&admin, TokenKind::Access).unwrap_err(),
            TokenError::WrongKind
        );
        assert_eq!(
            codec.validate::<AdminClaims>(&access, TokenKind::AdminSession).unwrap_err(),
            TokenError::WrongKind
        );
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let token = TokenCodec::new("other-secret")
            .issue(UserClaims::new(TokenKind::Access, 1, 1, 0, None), TTL)
            .unwrap();
        assert_eq!(
            codec().validate::<UserClaims>(&token, TokenKind::Access).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn test_other_hmac_algorithms_are_rejected() {
        let mut claims = UserClaims::new(TokenKind::Access, 1, 1, 0, None);
        let now = Utc::now().timestamp();
        claims.set_lifetime(now, now + 60);
        let key = EncodingKey::from_secret(SECRET.as_bytes());

        for alg in [Algorithm::HS384, Algorithm::HS512] {
            let token = encode(&Header::new(alg), &claims, &key).unwrap();
            assert_eq!(
                codec().validate::<UserClaims>(&token, TokenKind::Access).unwrap_err(),
                TokenError::BadSignature
            );
        }
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(
            codec().validate::<UserClaims>("not-a-token", TokenKind::Access).unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let now = Utc::now().timestamp();
        let payload = serde_json::json!({ "type": "access", "exp": now + 60, "iat": now });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(
            codec().validate::<UserClaims>(&token, TokenKind::Access).unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_token_errors_map_to_invalid_credential() {
        let err: AppError = TokenError::Expired.into();
        assert!(err.is(ErrorKind::InvalidCredential));
        let err: AppError = TokenError::Encoding.into();
        assert!(err.is(ErrorKind::Internal));
    }
}
