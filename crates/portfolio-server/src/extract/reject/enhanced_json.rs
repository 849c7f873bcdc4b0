//! Enhanced JSON extractor with improved error handling.
//!
//! This module provides [`Json`], an enhanced version of [`axum::Json`]
//! whose rejections are rendered as JSON error responses.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::handler::message;
use crate::handler::{Error, ErrorKind};

/// Enhanced JSON extractor with improved error handling.
///
/// - A missing or different `Content-Type` is rejected with
///   `415 Unsupported Media Type`.
/// - Syntax and data errors are rejected with `400 Bad Request`.
///
/// Parser messages are kept in the error context for logs and never
/// reach the client.
///
/// [`Json`]: AxumJson
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Creates a new [`Json`] wrapper around the provided value.
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extractor = <AxumJson<T> as FromRequest<S>>::from_request(req, state).await;
        extractor.map(|x| Self::new(x.0)).map_err(Into::into)
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    #[inline]
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<JsonRejection> for Error<'static> {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => ErrorKind::UnsupportedMediaType
                .with_detail(message::ONLY_SUPPORTED_APPLICATION_JSON)
                .with_context("request content type is not application/json"),
            JsonRejection::JsonDataError(err) => ErrorKind::BadRequest
                .with_detail(message::MALFORMED_BODY)
                .with_context(format!(
                    "JSON deserialization failed: {}",
                    sanitize_error_message(&err.body_text())
                )),
            JsonRejection::JsonSyntaxError(err) => ErrorKind::BadRequest
                .with_detail(message::MALFORMED_BODY)
                .with_context(format!(
                    "JSON parsing failed: {}",
                    sanitize_error_message(&err.body_text())
                )),
            JsonRejection::BytesRejection(err) => ErrorKind::BadRequest
                .with_detail(message::MALFORMED_BODY)
                .with_context(format!(
                    "request body processing failed: {}",
                    sanitize_error_message(&err.body_text())
                )),
            rejection => ErrorKind::InternalServerError.with_context(format!(
                "unexpected JSON rejection: {}",
                rejection.body_text()
            )),
        }
    }
}

/// Limits parser messages to a few short lines.
fn sanitize_error_message(message: &str) -> String {
    let lines = message.lines().take(3).collect::<Vec<_>>();
    lines.join(" ").chars().take(200).collect()
}
