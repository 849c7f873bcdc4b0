//! Validated JSON extractor with automatic validation.
//!
//! This module provides [`ValidateJson`], an enhanced JSON extractor that
//! combines deserialization with automatic validation using the `validator` crate.

use std::collections::BTreeMap;

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use super::Json;
use crate::handler::{Error, ErrorKind};

/// Tracing target for request validation failures.
const TRACING_TARGET: &str = "portfolio_server::extract::validation";

/// Enhanced JSON extractor with automatic validation using the `validator` crate.
///
/// Validation failures are rejected with `400 Bad Request` and a `details`
/// map holding the first violation of every offending field.
///
/// Also see [`Json`].
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    /// Creates a new instance of [`ValidateJson`].
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner validated value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;

        data.validate()?;
        Ok(Self::new(data))
    }
}

/// Returns the first violation of every field, keyed by its JSON name and
/// sorted by field.
pub fn first_violations(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, field_errors)| {
            let first = field_errors.first()?;
            Some((to_camel_case(&field), format_validation_error(first)))
        })
        .collect()
}

/// Formats a single violation, preferring the rule's own message.
fn format_validation_error(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    match error.code.as_ref() {
        "required" => "Value is required.".to_string(),
        "length" => "Value has an invalid length.".to_string(),
        "email" => "Value must be a valid email address.".to_string(),
        code => format!("Value failed validation: {code}."),
    }
}

/// Converts a Rust field name into the camelCase name used on the wire.
fn to_camel_case(field: &str) -> String {
    let mut camel = String::with_capacity(field.len());
    let mut upper_next = false;

    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            camel.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            camel.push(c);
        }
    }

    camel
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let details = first_violations(&errors);

        tracing::debug!(
            target: TRACING_TARGET,
            fields = ?details.keys().collect::<Vec<_>>(),
            "request validation failed"
        );

        ErrorKind::BadRequest
            .with_details(details)
            .with_context("request validation failed")
    }
}
