use std::borrow::Cow;
use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::handler::message;

/// Tracing target for rendered error responses.
const TRACING_TARGET: &str = "portfolio_server::handler::error";

/// HTTP error response body.
///
/// Serialized as `{message, detail?, details?}`. The status code and the
/// internal context are never serialized.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse<'a> {
    /// Category message safe for client display.
    pub message: Cow<'a, str>,
    /// Optional single detail string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Cow<'a, str>>,
    /// Optional field-scoped messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,

    /// Internal context for debugging (not exposed to client)
    #[serde(skip)]
    pub context: Option<Cow<'a, str>>,
    /// HTTP status code (not serialized in JSON)
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    // 4xx Client Errors
    pub const BAD_REQUEST: Self = Self::new(message::BAD_REQUEST, StatusCode::BAD_REQUEST);
    pub const CONFLICT: Self = Self::new(message::CONFLICT, StatusCode::CONFLICT);
    pub const FORBIDDEN: Self = Self::new(message::FORBIDDEN, StatusCode::FORBIDDEN);
    pub const NOT_FOUND: Self = Self::new(message::NOT_FOUND, StatusCode::NOT_FOUND);
    pub const UNAUTHORIZED: Self = Self::new(message::UNAUTHORIZED, StatusCode::UNAUTHORIZED);
    pub const UNSUPPORTED_MEDIA_TYPE: Self = Self::new(
        message::UNSUPPORTED_MEDIA_TYPE,
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
    );
    // 5xx Server Errors
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        message::INTERNAL_SERVER_ERROR,
        StatusCode::INTERNAL_SERVER_ERROR,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(message: &'a str, status: StatusCode) -> Self {
        Self {
            message: Cow::Borrowed(message),
            detail: None,
            details: None,
            context: None,
            status,
        }
    }

    /// Sets the detail string, replacing any previous one.
    pub fn with_detail(mut self, detail: impl Into<Cow<'a, str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Sets the field-scoped messages.
    pub fn with_details(mut self, details: BTreeMap<String, String>) -> Self {
        self.details = Some(details);
        self
    }

    /// Attaches context to the error response.
    /// If context already exists, it merges them with a separator.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let new_context = context.into();
        self.context = Some(match self.context {
            Some(existing) => Cow::Owned(format!("{}; {}", existing, new_context)),
            None => new_context,
        });
        self
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        if let Some(context) = self.context.as_deref() {
            tracing::debug!(
                target: TRACING_TARGET,
                status = self.status.as_u16(),
                context = context,
                "rendering error response"
            );
        }

        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_merging_context() {
        let response = ErrorResponse::INTERNAL_SERVER_ERROR
            .with_context("store unavailable")
            .with_context("retry attempted");

        assert_eq!(
            response.context.as_deref(),
            Some("store unavailable; retry attempted")
        );
    }

    #[test]
    fn error_response_serialization() -> anyhow::Result<()> {
        let response = ErrorResponse::UNAUTHORIZED
            .with_detail(message::NOT_LOGGED_IN)
            .with_context("token expired");

        let json = serde_json::to_value(&response)?;

        assert_eq!(json["message"], message::UNAUTHORIZED);
        assert_eq!(json["detail"], message::NOT_LOGGED_IN);
        assert!(json.get("details").is_none());
        assert!(json.get("context").is_none());
        assert!(json.get("status").is_none());
        Ok(())
    }

    #[test]
    fn error_response_with_details() -> anyhow::Result<()> {
        let details = BTreeMap::from([("title".to_owned(), "required".to_owned())]);
        let json = serde_json::to_value(ErrorResponse::BAD_REQUEST.with_details(details))?;

        assert_eq!(json["details"]["title"], "required");
        assert!(json.get("detail").is_none());
        Ok(())
    }
}
