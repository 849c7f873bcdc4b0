//! Secure password hashing and verification using Argon2id.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::utility::tracing_targets::TRACING_TARGET_PASSWORD_HASHER as TRACING_TARGET;
use crate::{Error, Result};

/// Password hashing and verification service using Argon2id.
///
/// Hashes are stored in PHC string format, so each one carries its own
/// salt and cost parameters.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    /// Creates a hasher with OWASP recommended Argon2id parameters.
    pub fn new() -> Result<Self> {
        Self::from_argon2(Argon2::default())
    }

    /// Creates a hasher with explicit Argon2id cost parameters.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| Error::config("invalid password hash parameters").with_source(e))?;

        Self::from_argon2(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn from_argon2(argon2: Argon2<'static>) -> Result<Self> {
        let dummy_password: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        let mut hasher = Self {
            argon2,
            dummy_hash: Arc::from(""),
        };

        hasher.dummy_hash = Arc::from(hasher.hash_password(&dummy_password)?);
        Ok(hasher)
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password hashing operation failed"
                );
                Error::auth("password hashing failed").with_source(e)
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only for unreadable hashes
    /// or internal failures.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %e,
                "invalid password hash format"
            );
            Error::auth("stored password hash is malformed").with_source(e)
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(ArgonError::Password) => Ok(false),
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password verification system error"
                );
                Err(Error::auth("password verification failed").with_source(e))
            }
        }
    }

    /// Runs a verification against a throwaway hash.
    ///
    /// Used when no account matches the identifier, so that the response
    /// time does not reveal whether the account exists. Always `false`.
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        let _ = self.verify_password(password, &self.dummy_hash);
        false
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}
