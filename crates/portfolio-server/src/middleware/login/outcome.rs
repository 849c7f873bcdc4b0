//! Rendering of login outcomes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::LoginFailure;
use crate::extract::Json;
use crate::handler::response::LoginResponse;
use crate::handler::{Error, ErrorKind, message};
use crate::service::AccessToken;
use crate::utility::tracing_targets::TRACING_TARGET_LOGIN as TRACING_TARGET;

/// Renders an issued token as `200 OK {message, accessToken}`.
pub fn on_login_success(token: AccessToken) -> Response {
    let response = LoginResponse {
        message: message::OK.to_owned(),
        access_token: token.into_string(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Maps a login failure onto its status code and detail message.
///
/// Unknown identifiers and wrong secrets share one response.
pub fn on_login_failure(failure: LoginFailure) -> Response {
    tracing::info!(
        target: TRACING_TARGET,
        failure = %failure,
        "login failed"
    );

    let error: Error<'static> = match failure {
        LoginFailure::UnsupportedMediaType => ErrorKind::UnsupportedMediaType
            .with_detail(message::ONLY_SUPPORTED_APPLICATION_JSON),
        LoginFailure::AlreadyAuthenticated => {
            ErrorKind::Forbidden.with_detail(message::ALREADY_LOGIN)
        }
        LoginFailure::Malformed(reason) => ErrorKind::BadRequest
            .with_detail(message::MALFORMED_BODY)
            .with_context(reason),
        LoginFailure::ValidationFailed(violations) => {
            ErrorKind::BadRequest.with_detail(violations)
        }
        LoginFailure::NoSuchPrincipal | LoginFailure::BadCredentials => {
            ErrorKind::Unauthorized.with_detail(message::CREDENTIALS_MISMATCH)
        }
        LoginFailure::Internal(error) => error.into(),
    };

    error.into_response()
}
