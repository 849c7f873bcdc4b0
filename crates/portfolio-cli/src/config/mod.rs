//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, shutdown
//! ├── middleware: MiddlewareConfig  # Request timeout
//! └── service: ServiceConfig        # Signing key, token header, hashing cost
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//!
//! # Example
//!
//! ```bash
//! JWT_SECRET_KEY="..." PORT=8080 portfolio
//! ```

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use middleware::MiddlewareConfig;
use portfolio_server::service::ServiceConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "portfolio")]
#[command(about = "Portfolio authentication and article server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration.
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Token signing and password hashing configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Loads a `.env` file (if enabled) and parses CLI arguments.
    ///
    /// The file is loaded first so that clap's `env` lookups see its values.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;
        Ok(())
    }

    /// Logs configuration. Never includes the signing key.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "build information"
        );

        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            token_header = %self.service.jwt_access_header,
            token_expiration_secs = self.service.jwt_access_expiration,
            hash_memory_kib = self.service.password_hash_memory_kib,
            hash_iterations = self.service.password_hash_iterations,
            "service configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "cG9ydGZvbGlvLXRlc3Qtc2lnbmluZy1rZXktd2l0aC1hdC1sZWFzdC0zMi1ieXRlcw==";

    #[test]
    fn parses_defaults_from_arguments() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["portfolio", "--jwt-secret-key", TEST_SECRET])?;

        assert_eq!(cli.server.port, 3000);
        assert_eq!(cli.middleware.recovery.request_timeout, 30);
        assert_eq!(cli.service.jwt_access_header, "Authorization");
        cli.validate()?;
        Ok(())
    }

    #[test]
    fn rejects_privileged_port() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "portfolio",
            "--jwt-secret-key",
            TEST_SECRET,
            "--port",
            "80",
        ])?;

        assert!(cli.validate().is_err());
        Ok(())
    }
}
