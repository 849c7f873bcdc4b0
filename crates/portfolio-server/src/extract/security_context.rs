//! Request-scoped security context.
//!
//! The token authentication middleware inserts a [`SecurityContext`] into
//! the request extensions before anything else runs. Middleware further
//! down and handlers read it back through the extractors in this module.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::Extensions;
use axum::http::request::Parts;
use derive_more::Deref;

use crate::handler::message::NOT_LOGGED_IN;
use crate::handler::{Error, ErrorKind};
use crate::service::{Authentication, TokenError};

/// Identity established for the current request, if any.
///
/// Holds at most one [`Authentication`]. An empty context means the request
/// is anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    authentication: Option<Authentication>,
}

impl SecurityContext {
    /// Creates an empty (anonymous) context.
    #[inline]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Creates a context holding `authentication`.
    #[inline]
    pub fn authenticated(authentication: Authentication) -> Self {
        Self {
            authentication: Some(authentication),
        }
    }

    /// Returns whether an identity is present.
    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }

    /// Returns the established identity, if any.
    #[inline]
    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    /// Consumes the context and returns the established identity, if any.
    #[inline]
    pub fn into_authentication(self) -> Option<Authentication> {
        self.authentication
    }

    /// Reads the context from request extensions.
    ///
    /// Requests that never passed the token authentication middleware are
    /// treated as anonymous.
    pub fn from_extensions(extensions: &Extensions) -> Self {
        extensions.get::<Self>().cloned().unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for SecurityContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_extensions(&parts.extensions))
    }
}

/// Token verification failure recorded for a request that presented a
/// bearer token which could not be verified.
///
/// Only used for diagnostics. The client never sees which check failed.
#[derive(Debug, Clone, Deref)]
pub struct PendingAuthError(pub TokenError);

/// Identity of an authenticated request.
///
/// Rejects anonymous requests with `401 Unauthorized`.
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct Authenticated(pub Authentication);

impl Authenticated {
    /// Returns the inner [`Authentication`].
    #[inline]
    pub fn into_inner(self) -> Authentication {
        self.0
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        SecurityContext::from_extensions(&parts.extensions)
            .into_authentication()
            .map(Self)
            .ok_or_else(|| {
                ErrorKind::Unauthorized
                    .with_detail(NOT_LOGGED_IN)
                    .with_context("no authenticated identity in security context")
            })
    }
}
