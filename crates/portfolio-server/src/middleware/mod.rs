//! Middleware for `axum::Router` and HTTP request processing.
//!
//! Authentication pipeline, outermost first:
//!
//! 1. [`attach_security_context`] verifies the bearer token, if any, and
//!    attaches the resulting [`SecurityContext`].
//! 2. [`enforce_access_policy`] checks the route against the [`AccessPolicy`].
//! 3. [`login_interceptor`] answers `POST /api/v1/login`.
//!
//! Recovery and observability layers are applied by the binary through
//! [`RouterRecoveryExt`] and [`RouterObservabilityExt`].
//!
//! [`SecurityContext`]: crate::extract::SecurityContext

mod access;
mod login;
mod observability;
mod recovery;
mod token_auth;

pub use access::{AccessDecision, AccessPolicy, AccessRule, RoutePolicy, enforce_access_policy};
pub use login::{
    LOGIN_PATH, LoginFailure, LoginInterceptor, LoginStage, login_interceptor, on_login_failure,
    on_login_success,
};
pub use observability::{REQUEST_ID_HEADER, RouterObservabilityExt};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use token_auth::{TokenAuthOutcome, attach_security_context, authenticate};
