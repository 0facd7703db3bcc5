//! Argon2id password hashing for email/password accounts.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};

use appbase_core::AppError;
use appbase_core::config::AuthConfig;

/// Hashes and checks end-user passwords.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    min_length: usize,
}

impl PasswordHasher {
    /// Create a hasher enforcing the configured minimum length.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Reject passwords shorter than the configured minimum.
    pub fn check_policy(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        Ok(())
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// Whether `password` matches the stored PHC string.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| AppError::internal(format!("Stored password hash is invalid: {e}")))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(&AuthConfig::default())
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = hasher();
        let hash = hasher.hash("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("hunter22", &hash).unwrap());
        assert!(!hasher.verify("hunter23", &hash).unwrap());
    }

    #[test]
    fn test_policy_min_length() {
        let hasher = hasher();
        assert!(hasher.check_policy("12345").is_err());
        assert!(hasher.check_policy("123456").is_ok());
    }
}
