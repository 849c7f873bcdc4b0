//! Bearer token authentication.
//!
//! Runs on every request. A verified token populates the
//! [`SecurityContext`]; anything else leaves the request anonymous. This
//! stage never rejects a request, enforcement is left to
//! [`enforce_access_policy`].
//!
//! [`enforce_access_policy`]: crate::middleware::enforce_access_policy

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::extract::{PendingAuthError, SecurityContext};
use crate::service::{Authentication, TokenCodec, TokenError};
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION as TRACING_TARGET;

/// Result of authenticating a single request.
#[derive(Debug, Clone)]
pub struct TokenAuthOutcome {
    /// Context to attach to the request.
    pub context: SecurityContext,
    /// Why a presented token was not accepted, if one was presented.
    pub diagnostic: Option<TokenError>,
}

/// Authenticates a request from its headers.
///
/// - No bearer token: anonymous context, no diagnostic.
/// - Token fails verification: anonymous context with the failure as diagnostic.
/// - Token verifies: context holding the token's identity and authorities.
pub fn authenticate(codec: &TokenCodec, headers: &HeaderMap) -> TokenAuthOutcome {
    let header_value = headers
        .get(codec.header_name())
        .and_then(|value| value.to_str().ok());

    let Some(token) = TokenCodec::extract_bearer(header_value) else {
        return TokenAuthOutcome {
            context: SecurityContext::anonymous(),
            diagnostic: None,
        };
    };

    match codec.verify(token) {
        Ok(claims) => {
            let authentication = Authentication::new(claims.identity(), claims.authorities());
            TokenAuthOutcome {
                context: SecurityContext::authenticated(authentication),
                diagnostic: None,
            }
        }
        Err(error) => TokenAuthOutcome {
            context: SecurityContext::anonymous(),
            diagnostic: Some(error),
        },
    }
}

/// Attaches a [`SecurityContext`] (and a [`PendingAuthError`] when a token
/// was rejected) to the request and passes it on.
pub async fn attach_security_context(
    State(codec): State<TokenCodec>,
    mut request: Request,
    next: Next,
) -> Response {
    let TokenAuthOutcome {
        context,
        diagnostic,
    } = authenticate(&codec, request.headers());

    match (&diagnostic, context.authentication()) {
        (Some(error), _) => {
            tracing::debug!(
                target: TRACING_TARGET,
                reason = %error.kind(),
                error = %error,
                "bearer token rejected, continuing anonymously"
            );
        }
        (None, Some(authentication)) => {
            tracing::debug!(
                target: TRACING_TARGET,
                identity = %authentication.identity,
                "bearer token verified"
            );
        }
        (None, None) => {
            tracing::trace!(target: TRACING_TARGET, "no bearer token presented");
        }
    }

    let extensions = request.extensions_mut();
    if let Some(error) = diagnostic {
        extensions.insert(PendingAuthError(error));
    }
    extensions.insert(context);

    next.run(request).await
}
