//! Password hashing using Argon2id
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so the
//! salt and cost parameters travel with the hash and verification needs nothing
//! else.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::fmt::Debug;

use crate::config::PasswordConfig;
use crate::domain::DomainError;

/// Prefix shared by every hash this module produces
pub const ARGON2ID_PREFIX: &str = "$argon2id$";

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password with a fresh random salt
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a stored hash. Malformed hashes never verify.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id password hasher with configurable cost
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Argon2Hasher {
    /// Create a hasher with the library's recommended parameters
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Create a hasher with explicit cost parameters
    pub fn with_params(
        memory_cost_kib: u32,
        time_cost: u32,
        parallelism: u32,
    ) -> Result<Self, DomainError> {
        let params = Params::new(memory_cost_kib, time_cost, parallelism, None)
            .map_err(|e| DomainError::configuration(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self { params })
    }

    /// Build a hasher from configuration
    pub fn from_config(config: &PasswordConfig) -> Result<Self, DomainError> {
        Self::with_params(config.memory_cost_kib, config.time_cost, config.parallelism)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        // Parameters come from the PHC string, not from self
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> Argon2Hasher {
        Argon2Hasher::with_params(8, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let password = "my_secure_password";

        let hash = hasher.hash(password).unwrap();

        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_hash_format() {
        let hasher = fast_hasher();

        let hash = hasher.hash("password").unwrap();

        assert_ne!(hash, "password");
        assert!(hash.starts_with(ARGON2ID_PREFIX));
        assert!(hash.contains("m=8,t=1,p=1"));
    }

    #[test]
    fn test_hash_is_unique() {
        let hasher = fast_hasher();
        let password = "my_secure_password";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // Different salts
        assert_ne!(hash1, hash2);

        assert!(hasher.verify(password, &hash1));
        assert!(hasher.verify(password, &hash2));
    }

    #[test]
    fn test_verify_across_cost_settings() {
        let cheap = fast_hasher();
        let other = Argon2Hasher::with_params(16, 2, 1).unwrap();

        let hash = cheap.hash("password").unwrap();
        assert!(other.verify("password", &hash));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = fast_hasher();

        assert!(!hasher.verify("password", "invalid_hash_format"));
        assert!(!hasher.verify("password", "HASHED_PASSWORD"));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn test_invalid_params() {
        let result = Argon2Hasher::with_params(8, 0, 1);
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_from_config() {
        let config = PasswordConfig {
            memory_cost_kib: 8,
            time_cost: 1,
            parallelism: 1,
        };

        let hasher = Argon2Hasher::from_config(&config).unwrap();
        let hash = hasher.hash("password").unwrap();
        assert!(hasher.verify("password", &hash));
    }
}
