//! Observability middleware for request tracing.
//!
//! Requests get a unique `x-request-id` that is echoed on the response,
//! and token-bearing headers are marked sensitive so they never show up
//! in trace output.

use axum::Router;
use axum::http::HeaderName;
use axum::http::header;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
pub trait RouterObservabilityExt<S> {
    /// Layers observability middleware for request tracing and logging.
    ///
    /// `token_header` is the header the access token is read from; it is
    /// redacted along with `Authorization` and `Cookie`.
    fn with_observability(self, token_header: &HeaderName) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self, token_header: &HeaderName) -> Self {
        let sensitive_headers = [
            header::AUTHORIZATION,
            header::COOKIE,
            token_header.clone(),
        ];

        let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

        // Apply layers in reverse order (last layer wraps first)
        self.layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(SetSensitiveRequestHeadersLayer::new(sensitive_headers))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;

    #[tokio::test]
    async fn responses_carry_request_id() -> anyhow::Result<()> {
        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .with_observability(&header::AUTHORIZATION);
        let server = TestServer::new(router)?;

        let response = server.get("/").await;
        response.assert_status_ok();
        assert!(response.maybe_header(REQUEST_ID_HEADER).is_some());
        Ok(())
    }

    #[tokio::test]
    async fn incoming_request_id_is_propagated() -> anyhow::Result<()> {
        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .with_observability(&HeaderName::from_static("x-access-token"));
        let server = TestServer::new(router)?;

        let response = server
            .get("/")
            .add_header(
                HeaderName::from_static(REQUEST_ID_HEADER),
                HeaderValue::from_static("req-42"),
            )
            .await;
        assert_eq!(response.header(REQUEST_ID_HEADER), "req-42");
        Ok(())
    }
}
