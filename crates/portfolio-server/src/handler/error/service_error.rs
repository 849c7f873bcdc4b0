//! Service error to HTTP error conversion.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::ErrorKind as ServiceErrorKind;

/// Tracing target for service error conversions.
const TRACING_TARGET: &str = "portfolio_server::handler::service";

impl From<crate::Error> for HttpError<'static> {
    fn from(error: crate::Error) -> Self {
        match error.kind() {
            ServiceErrorKind::Store => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "store operation failed"
                );
            }
            ServiceErrorKind::Config | ServiceErrorKind::Auth | ServiceErrorKind::Internal => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = %error.kind(),
                    "service operation failed"
                );
            }
        }

        ErrorKind::InternalServerError.with_context(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_become_internal_server_errors() {
        let error: HttpError<'static> = crate::Error::store("lock poisoned").into();

        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.detail(), None);
        assert!(error.context().is_some_and(|c| c.contains("lock poisoned")));
    }
}
