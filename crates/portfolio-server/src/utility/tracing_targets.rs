//! Centralized tracing target constants for structured logging.
//!
//! Using consistent targets enables fine-grained control over log output
//! via tracing subscriber filters, e.g.
//! `RUST_LOG=portfolio_server::authentication=debug`.

/// Token extraction and verification on incoming requests.
pub const TRACING_TARGET_AUTHENTICATION: &str = "portfolio_server::authentication";

/// Route access policy decisions.
pub const TRACING_TARGET_AUTHORIZATION: &str = "portfolio_server::authorization";

/// JSON login flow: credential parsing, verification and token issuance.
pub const TRACING_TARGET_LOGIN: &str = "portfolio_server::login";

/// Account registration.
pub const TRACING_TARGET_SIGNUP: &str = "portfolio_server::signup";

/// Article creation.
pub const TRACING_TARGET_ARTICLES: &str = "portfolio_server::articles";

/// Error recovery including middleware errors and request failures.
pub const TRACING_TARGET_RECOVERY_ERROR: &str = "portfolio_server::recovery::error";

/// Panic recovery including handler panics and service failures.
pub const TRACING_TARGET_RECOVERY_PANIC: &str = "portfolio_server::recovery::panic";

/// Password hashing and verification operations.
pub const TRACING_TARGET_PASSWORD_HASHER: &str = "portfolio_server::password_hasher";

/// Token signing key management.
pub const TRACING_TARGET_TOKEN_CODEC: &str = "portfolio_server::token_codec";

/// In-memory user and article store.
pub const TRACING_TARGET_STORE: &str = "portfolio_server::store";
