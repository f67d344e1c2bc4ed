//! Password hashing and verification across schemes.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use tracing::debug;

use shelter_core::config::AuthConfig;

use crate::error::AuthError;

use super::legacy;
use super::scheme::{HashScheme, HashStatus, StoredHash};

/// Hashes new passwords with Argon2id and verifies any supported scheme.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// Argon2 cost parameters for new hashes.
    params: Params,
}

impl PasswordHasher {
    /// Creates a hasher using the cost parameters from auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        Self::with_params(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
        )
    }

    /// Creates a hasher with explicit Argon2 cost parameters.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::Internal(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext password with the current scheme and a random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {e}")))?;
        Ok(HashScheme::CURRENT.tagged(&hash.to_string()))
    }

    /// Verifies a plaintext password against a stored, scheme-tagged hash.
    ///
    /// Unknown tags and malformed bodies return `false`.
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        let parsed = StoredHash::parse(stored);
        let Some((scheme, body)) = parsed.verifying_scheme() else {
            debug!(?parsed, "Unrecognized password hash scheme");
            return false;
        };
        match scheme {
            HashScheme::Argon2 => self.verify_argon2(plaintext, body),
            HashScheme::Pbkdf2 => legacy::verify(plaintext, body),
        }
    }

    fn verify_argon2(&self, plaintext: &str, body: &str) -> bool {
        let parsed = match PasswordHash::new(body) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Malformed Argon2 hash");
                return false;
            }
        };
        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                debug!(error = %e, "Argon2 verification error");
                false
            }
        }
    }

    /// Whether a stored hash should be replaced by a current-scheme hash.
    pub fn needs_rehash(&self, stored: &str) -> bool {
        StoredHash::parse(stored).status() != HashStatus::Current
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::DEFAULT,
        }
    }
}
