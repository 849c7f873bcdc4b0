#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use portfolio_server::handler::routes;
use portfolio_server::middleware::{RouterObservabilityExt, RouterRecoveryExt};
use portfolio_server::service::ServiceState;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Cli, MiddlewareConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "portfolio_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "portfolio_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "portfolio_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    init_tracing();
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting portfolio server"
    );

    cli.log();
    cli.validate()?;

    let state = ServiceState::from_config(&cli.service)
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    if let Err(error) = server::serve(router, cli.server).await {
        if let Some(suggestion) = error.suggestion() {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                suggestion,
                "recovery suggestion"
            );
        }
        return Err(error.into());
    }

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Last added is outermost:
/// 1. Recovery, catches panics and enforces the request timeout
/// 2. Observability, request IDs and tracing spans
/// 3. Routes with the authentication pipeline
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    let token_header = state.token_codec().header_name().clone();

    routes(state)
        .with_observability(&token_header)
        .with_recovery(&middleware.recovery)
}

/// Initializes tracing with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
