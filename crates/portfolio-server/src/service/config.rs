use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::service::{MemoryStore, PasswordHasher, Result, TokenCodec};

/// Default values for configuration options.
mod defaults {
    /// Default header carrying the bearer access token.
    pub const JWT_ACCESS_HEADER: &str = "Authorization";

    /// Default access token lifetime in seconds (one hour).
    pub const JWT_ACCESS_EXPIRATION_SECS: u64 = 3600;

    /// Argon2id memory cost in KiB (OWASP recommendation).
    pub const PASSWORD_HASH_MEMORY_KIB: u32 = 19 * 1024;

    /// Argon2id iteration count.
    pub const PASSWORD_HASH_ITERATIONS: u32 = 2;

    /// Argon2id lanes.
    pub const PASSWORD_HASH_PARALLELISM: u32 = 1;

    /// Development-only signing key, base64 of a 57-byte string.
    #[cfg(debug_assertions)]
    pub const DEVELOPMENT_SECRET_KEY: &str =
        "cG9ydGZvbGlvLWRldmVsb3BtZW50LXNpZ25pbmcta2V5LW5ldmVyLXVzZS1pbi1wcm9kdWN0aW9u";
}

/// Minimum decoded length of the token signing key in bytes.
pub(crate) const MIN_SECRET_KEY_BYTES: usize = 32;

/// Longest accepted access token lifetime (30 days).
const MAX_ACCESS_EXPIRATION_SECS: u64 = 30 * 24 * 60 * 60;

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Base64-encoded symmetric key used to sign and verify access tokens.
    #[cfg_attr(feature = "config", arg(long, env = "JWT_SECRET_KEY"))]
    #[serde(skip_serializing)]
    pub jwt_secret_key: String,

    /// Name of the request header carrying the `Bearer` access token.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "JWT_ACCESS_HEADER", default_value = defaults::JWT_ACCESS_HEADER)
    )]
    #[builder(default = "defaults::JWT_ACCESS_HEADER.to_string()")]
    pub jwt_access_header: String,

    /// Access token lifetime in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "JWT_ACCESS_EXPIRATION", default_value_t = defaults::JWT_ACCESS_EXPIRATION_SECS)
    )]
    #[builder(default = "defaults::JWT_ACCESS_EXPIRATION_SECS")]
    pub jwt_access_expiration: u64,

    /// Argon2id memory cost in KiB.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PASSWORD_HASH_MEMORY_KIB", default_value_t = defaults::PASSWORD_HASH_MEMORY_KIB)
    )]
    #[builder(default = "defaults::PASSWORD_HASH_MEMORY_KIB")]
    pub password_hash_memory_kib: u32,

    /// Argon2id iteration count.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PASSWORD_HASH_ITERATIONS", default_value_t = defaults::PASSWORD_HASH_ITERATIONS)
    )]
    #[builder(default = "defaults::PASSWORD_HASH_ITERATIONS")]
    pub password_hash_iterations: u32,

    /// Argon2id degree of parallelism.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PASSWORD_HASH_PARALLELISM", default_value_t = defaults::PASSWORD_HASH_PARALLELISM)
    )]
    #[builder(default = "defaults::PASSWORD_HASH_PARALLELISM")]
    pub password_hash_parallelism: u32,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Returns the access token lifetime as a Duration.
    #[inline]
    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt_access_expiration)
    }

    /// Loads the token signing key and binds it to the configured header.
    pub fn create_token_codec(&self) -> Result<TokenCodec> {
        TokenCodec::new(
            &self.jwt_secret_key,
            &self.jwt_access_header,
            self.access_token_ttl(),
        )
    }

    /// Creates the Argon2id password hasher with the configured cost.
    pub fn create_password_hasher(&self) -> Result<PasswordHasher> {
        PasswordHasher::with_params(
            self.password_hash_memory_kib,
            self.password_hash_iterations,
            self.password_hash_parallelism,
        )
    }

    /// Opens the user and article store.
    pub fn open_store(&self) -> MemoryStore {
        MemoryStore::new()
    }
}

impl ServiceConfigBuilder {
    /// Wrapper for builder validation that returns String errors.
    fn validate(builder: &ServiceConfigBuilder) -> Result<(), String> {
        if let Some(secret) = &builder.jwt_secret_key {
            let decoded = BASE64
                .decode(secret.trim())
                .map_err(|_| "JWT secret key must be valid base64".to_string())?;

            if decoded.len() < MIN_SECRET_KEY_BYTES {
                return Err(format!(
                    "JWT secret key must decode to at least {} bytes",
                    MIN_SECRET_KEY_BYTES
                ));
            }
        }

        if let Some(header) = &builder.jwt_access_header
            && header.trim().is_empty()
        {
            return Err("JWT access header name cannot be empty".to_string());
        }

        if let Some(expiration) = &builder.jwt_access_expiration {
            if *expiration == 0 {
                return Err("JWT access expiration must be at least 1 second".to_string());
            }
            if *expiration > MAX_ACCESS_EXPIRATION_SECS {
                return Err(format!(
                    "JWT access expiration cannot exceed {} seconds",
                    MAX_ACCESS_EXPIRATION_SECS
                ));
            }
        }

        if let Some(parallelism) = &builder.password_hash_parallelism
            && *parallelism == 0
        {
            return Err("Password hash parallelism must be greater than 0".to_string());
        }

        if let Some(iterations) = &builder.password_hash_iterations
            && *iterations == 0
        {
            return Err("Password hash iterations must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("jwt_secret_key", &"[REDACTED]")
            .field("jwt_access_header", &self.jwt_access_header)
            .field("jwt_access_expiration", &self.jwt_access_expiration)
            .field("password_hash_memory_kib", &self.password_hash_memory_kib)
            .field("password_hash_iterations", &self.password_hash_iterations)
            .field("password_hash_parallelism", &self.password_hash_parallelism)
            .finish()
    }
}

#[cfg(debug_assertions)]
impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret_key: defaults::DEVELOPMENT_SECRET_KEY.to_string(),
            jwt_access_header: defaults::JWT_ACCESS_HEADER.to_string(),
            jwt_access_expiration: defaults::JWT_ACCESS_EXPIRATION_SECS,
            password_hash_memory_kib: defaults::PASSWORD_HASH_MEMORY_KIB,
            password_hash_iterations: defaults::PASSWORD_HASH_ITERATIONS,
            password_hash_parallelism: defaults::PASSWORD_HASH_PARALLELISM,
        }
    }
}
