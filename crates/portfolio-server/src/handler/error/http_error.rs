//! HTTP error handling with builder pattern for dynamic error responses.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// The error type for HTTP handlers and middleware.
///
/// Every error renders as `{message, detail?, details?}` where `message`
/// is the category message of its [`ErrorKind`]. The `context` is for
/// logs only and never reaches the client.
#[derive(Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error<'a> {
    kind: ErrorKind,
    context: Option<Cow<'a, str>>,
    detail: Option<Cow<'a, str>>,
    details: Option<BTreeMap<String, String>>,
}

impl Error<'static> {
    /// Creates a new [`Error`] with the specified kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
            detail: None,
            details: None,
        }
    }
}

impl<'a> Error<'a> {
    /// Attaches internal context used for logging.
    #[inline]
    pub fn with_context(self, context: impl Into<Cow<'a, str>>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }

    /// Sets the client-facing detail string.
    #[inline]
    pub fn with_detail(self, detail: impl Into<Cow<'a, str>>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..self
        }
    }

    /// Sets field-scoped messages, keyed by field name.
    #[inline]
    pub fn with_details(self, details: BTreeMap<String, String>) -> Self {
        Self {
            details: Some(details),
            ..self
        }
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the context if present.
    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Returns the detail if present.
    #[inline]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the field-scoped messages if present.
    #[inline]
    pub fn details(&self) -> Option<&BTreeMap<String, String>> {
        self.details.as_ref()
    }

    /// Converts this error into a static version by cloning all borrowed data.
    pub fn into_static(self) -> Error<'static> {
        Error {
            kind: self.kind,
            context: self.context.map(|c| Cow::Owned(c.into_owned())),
            detail: self.detail.map(|d| Cow::Owned(d.into_owned())),
            details: self.details,
        }
    }
}

impl Default for Error<'static> {
    #[inline]
    fn default() -> Self {
        Self::new(ErrorKind::default())
    }
}

impl fmt::Debug for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();

        let mut debug_struct = f.debug_struct("Error");
        debug_struct
            .field("kind", &self.kind)
            .field("status", &response.status)
            .field("message", &response.message);

        if let Some(ref detail) = self.detail {
            debug_struct.field("detail", detail);
        }

        if let Some(ref details) = self.details {
            debug_struct.field("details", details);
        }

        if let Some(ref context) = self.context {
            debug_struct.field("context", context);
        }

        debug_struct.finish()
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();
        write!(f, "{} ({})", self.kind, response.status)?;

        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }

        if let Some(ref context) = self.context {
            write!(f, " - {}", context)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        let mut response = self.kind.response();

        if let Some(detail) = self.detail {
            response = response.with_detail(detail);
        }

        if let Some(details) = self.details {
            response = response.with_details(details);
        }

        if let Some(context) = self.context {
            response = response.with_context(context);
        }

        response.into_response()
    }
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// A specialized [`Result`] type for HTTP operations.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Enumeration of the HTTP error kinds produced by this server.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // 4xx Client Errors
    /// 400 Bad Request - Invalid or unparseable request data
    BadRequest,
    /// 401 Unauthorized - No established identity or bad credentials
    Unauthorized,
    /// 403 Forbidden - Identity present but not allowed
    Forbidden,
    /// 404 Not Found - Resource not found
    NotFound,
    /// 409 Conflict - Duplicate resource
    Conflict,
    /// 415 Unsupported Media Type - Body is not `application/json`
    UnsupportedMediaType,

    // 5xx Server Errors
    /// 500 Internal Server Error - Unexpected server error
    #[default]
    InternalServerError,
}

impl ErrorKind {
    /// Converts this error kind into a full [`Error`].
    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    /// Creates an [`Error`] with the specified context.
    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_context(context)
    }

    /// Creates an [`Error`] with the specified client-facing detail.
    #[inline]
    pub fn with_detail<'a>(self, detail: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_detail(detail)
    }

    /// Creates an [`Error`] with the specified field-scoped messages.
    #[inline]
    pub fn with_details(self, details: BTreeMap<String, String>) -> Error<'static> {
        Error::new(self).with_details(details)
    }

    /// Returns the HTTP status code for this error kind.
    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Returns the response template for this error kind.
    #[inline]
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::Unauthorized => ErrorResponse::UNAUTHORIZED,
            Self::Forbidden => ErrorResponse::FORBIDDEN,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::Conflict => ErrorResponse::CONFLICT,
            Self::UnsupportedMediaType => ErrorResponse::UNSUPPORTED_MEDIA_TYPE,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a stable snake_case name for logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::UnsupportedMediaType => "unsupported_media_type",
            Self::InternalServerError => "internal_server_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_http_error() {
        let error = Error::default();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        let _ = error.into_response();
    }

    #[test]
    fn error_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorKind::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorKind::UnsupportedMediaType.status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn error_builder_chaining() {
        let error = ErrorKind::Unauthorized
            .with_detail("You are not logged in.")
            .with_context("token expired");

        assert_eq!(error.kind(), ErrorKind::Unauthorized);
        assert_eq!(error.detail(), Some("You are not logged in."));
        assert_eq!(error.context(), Some("token expired"));
    }

    #[test]
    fn error_with_details() {
        let details = BTreeMap::from([("email".to_owned(), "invalid".to_owned())]);
        let error = ErrorKind::BadRequest.with_details(details);

        assert_eq!(
            error.details().and_then(|d| d.get("email")).map(String::as_str),
            Some("invalid")
        );
    }

    #[test]
    fn std_fmt_display() {
        let error = ErrorKind::Conflict
            .with_detail("This email is already registered.")
            .with_context("signup");

        let display = format!("{}", error);
        assert!(display.contains("conflict"));
        assert!(display.contains("409"));
        assert!(display.contains("already registered"));
        assert!(display.contains("signup"));
    }

    #[test]
    fn error_into_static() {
        let detail = String::from("borrowed detail");
        let error = ErrorKind::BadRequest.with_detail(detail.as_str()).into_static();
        drop(detail);

        assert_eq!(error.detail(), Some("borrowed detail"));
    }
}
