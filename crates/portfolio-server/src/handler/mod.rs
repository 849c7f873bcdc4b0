//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`routes`] assembles the API with the authentication pipeline layered
//! around it, so every route, the login interceptor and the fallback see
//! the same [`SecurityContext`].
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler
//! [`SecurityContext`]: crate::extract::SecurityContext

mod articles;
mod authentication;
mod error;
pub mod message;
pub mod request;
pub mod response;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::middleware::{attach_security_context, enforce_access_policy, login_interceptor};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes and the authentication pipeline.
///
/// Layers, outermost first: security context, access policy, login
/// interceptor.
pub fn routes(state: ServiceState) -> Router {
    let attach_security_context = from_fn_with_state(state.clone(), attach_security_context);
    let enforce_access_policy = from_fn_with_state(state.clone(), enforce_access_policy);
    let login_interceptor = from_fn_with_state(state.clone(), login_interceptor);

    Router::new()
        .merge(authentication::routes())
        .merge(articles::routes())
        .fallback(handler)
        .layer(login_interceptor)
        .layer(enforce_access_policy)
        .layer(attach_security_context)
        .with_state(state)
}
