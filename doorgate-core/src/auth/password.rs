//! Password hashing and verification using Argon2id
//!
//! Hashes are stored as PHC strings, so the salt and the work factor travel
//! with the digest and old hashes keep verifying after the cost is raised.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use tracing::debug;

use crate::{DoorgateError, HasherParams, Result};

/// Salted one-way password hasher
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(params: HasherParams) -> Result<Self> {
        let params = Params::new(params.memory_kib, params.iterations, params.parallelism, None)
            .map_err(|e| DoorgateError::Config(format!("invalid argon2 parameters: {}", e)))?;

        Ok(PasswordHasher {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DoorgateError::Hashing(format!("failed to hash password: {}", e)))
    }

    /// Check `password` against a stored PHC string. The salt and cost come
    /// from `stored`; the digest comparison is constant time. A malformed
    /// `stored` value never matches.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                debug!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HasherParams::insecure_fast()).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("Secret1").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Secret1", &hash));
        assert!(!hasher.verify("Secret2", &hash));
    }

    #[test]
    fn test_different_salts() {
        let hasher = hasher();
        let hash1 = hasher.hash("same-password").unwrap();
        let hash2 = hasher.hash("same-password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("same-password", &hash1));
        assert!(hasher.verify("same-password", &hash2));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        let hasher = hasher();
        assert!(!hasher.verify("password", ""));
        assert!(!hasher.verify("password", "not-a-valid-hash"));
        assert!(!hasher.verify("password", "$argon2id$v=19$m=8,t=1,p=1"));
        assert!(!hasher.verify("password", "$2b$12$abcdefghijklmnopqrstuv"));
    }

    #[test]
    fn verifies_hashes_made_with_other_cost() {
        // the stored parameters win over the hasher's own
        let strong = PasswordHasher::new(HasherParams {
            memory_kib: 64,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        let hash = strong.hash("Secret1").unwrap();

        assert!(hasher().verify("Secret1", &hash));
    }

    #[test]
    fn verifies_hashes_from_stock_argon2() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"Secret1", &salt)
            .unwrap()
            .to_string();

        assert!(hasher().verify("Secret1", &hash));
        assert!(!hasher().verify("Secret2", &hash));
    }

    #[test]
    fn rejects_invalid_params() {
        let result = PasswordHasher::new(HasherParams {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        });
        assert!(matches!(result, Err(DoorgateError::Config(_))));
    }
}
