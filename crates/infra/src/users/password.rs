//! Argon2id password hashing with an optional server-side pepper.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Hashes and verifies passwords as PHC strings.
///
/// Every hash gets a fresh random salt. When a pepper is configured it is fed
/// to Argon2 as its secret input, so hashes only verify with the same pepper.
#[derive(Clone, Default)]
pub struct PasswordHashing {
    pepper: Option<Vec<u8>>,
}

impl core::fmt::Debug for PasswordHashing {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PasswordHashing")
            .field("peppered", &self.pepper.is_some())
            .finish()
    }
}

impl PasswordHashing {
    pub fn new(pepper: Option<&str>) -> Self {
        Self {
            pepper: pepper.map(|p| p.as_bytes().to_vec()),
        }
    }

    fn argon2(&self) -> Result<Argon2<'_>, PasswordError> {
        match &self.pepper {
            Some(pepper) => Argon2::new_with_secret(
                pepper,
                Algorithm::Argon2id,
                Version::V0x13,
                Params::default(),
            )
            .map_err(|e| PasswordError::Hashing(e.to_string())),
            None => Ok(Argon2::default()),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt_bytes: [u8; 16] = rand::random();
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;

        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        let parsed =
            PasswordHash::new(stored_hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        match self.argon2()?.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
        }
    }
}
