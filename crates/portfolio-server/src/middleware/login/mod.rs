//! JSON login.
//!
//! [`login_interceptor`] owns `POST /api/v1/login`: no route is registered
//! for it, the interceptor answers the request itself. Every other request
//! passes through untouched.
//!
//! A login attempt walks through the [`LoginStage`]s in order and stops at
//! the first [`LoginFailure`]. Outcomes are rendered by the functions in
//! [`outcome`].

mod outcome;

use std::collections::BTreeMap;

use axum::body::{Body, to_bytes};
use axum::extract::{FromRef, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method};
use axum::middleware::Next;
use axum::response::Response;
use validator::{Validate, ValidationErrors};

pub use self::outcome::{on_login_failure, on_login_success};
use crate::extract::SecurityContext;
use crate::handler::request::Credentials;
use crate::service::{
    AccessToken, CredentialError, ServiceState, SharedCredentialVerifier, TokenCodec,
};
use crate::utility::tracing_targets::TRACING_TARGET_LOGIN as TRACING_TARGET;

/// Path handled by the login interceptor.
pub const LOGIN_PATH: &str = "/api/v1/login";

/// Only accepted login content type.
const LOGIN_CONTENT_TYPE: &str = "application/json";

/// Largest accepted login body in bytes.
const MAX_LOGIN_BODY_BYTES: usize = 16 * 1024;

/// Progress of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum LoginStage {
    Idle,
    ContentTypeChecked,
    NotAlreadyAuthenticated,
    BodyParsed,
    FieldsValidated,
    CredentialsVerified,
    TokenIssued,
}

/// Terminal failure of a login attempt.
#[derive(Debug, thiserror::Error)]
pub enum LoginFailure {
    /// The content type is not exactly `application/json`.
    #[error("content type is not application/json")]
    UnsupportedMediaType,
    /// The request already carries an established identity.
    #[error("request is already authenticated")]
    AlreadyAuthenticated,
    /// The body could not be read or parsed into credentials.
    #[error("login body could not be parsed: {0}")]
    Malformed(String),
    /// The credentials break a format rule. Holds the joined violations.
    #[error("credentials failed validation: {0}")]
    ValidationFailed(String),
    /// No principal is registered under the identifier.
    #[error("no principal registered for the identifier")]
    NoSuchPrincipal,
    /// The secret does not match the stored hash.
    #[error("submitted secret does not match")]
    BadCredentials,
    /// The store, the hasher or the token signer failed.
    #[error(transparent)]
    Internal(#[from] crate::Error),
}

impl From<CredentialError> for LoginFailure {
    fn from(error: CredentialError) -> Self {
        match error {
            CredentialError::NotFound => Self::NoSuchPrincipal,
            CredentialError::Mismatch => Self::BadCredentials,
            CredentialError::Internal(error) => Self::Internal(error),
        }
    }
}

/// Login pipeline stage.
///
/// Verifies submitted credentials and mints an access token for them.
#[derive(Clone)]
pub struct LoginInterceptor {
    credential_verifier: SharedCredentialVerifier,
    token_codec: TokenCodec,
}

impl LoginInterceptor {
    /// Creates a new [`LoginInterceptor`].
    pub fn new(credential_verifier: SharedCredentialVerifier, token_codec: TokenCodec) -> Self {
        Self {
            credential_verifier,
            token_codec,
        }
    }

    /// Returns whether the request is a login attempt.
    pub fn intercepts(method: &Method, path: &str) -> bool {
        method == Method::POST && path == LOGIN_PATH
    }

    /// Runs one login attempt to completion.
    pub async fn attempt(
        &self,
        context: &SecurityContext,
        headers: &HeaderMap,
        body: Body,
    ) -> Result<AccessToken, LoginFailure> {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        if content_type != Some(LOGIN_CONTENT_TYPE) {
            return Err(LoginFailure::UnsupportedMediaType);
        }
        trace_stage(LoginStage::ContentTypeChecked);

        // Unreachable behind the access policy; guards direct `LoginInterceptor` use.
        if context.is_authenticated() {
            return Err(LoginFailure::AlreadyAuthenticated);
        }
        trace_stage(LoginStage::NotAlreadyAuthenticated);

        let bytes = to_bytes(body, MAX_LOGIN_BODY_BYTES)
            .await
            .map_err(|e| LoginFailure::Malformed(e.to_string()))?;
        let credentials: Credentials = serde_json::from_slice(&bytes)
            .map_err(|e| LoginFailure::Malformed(e.to_string()))?;
        trace_stage(LoginStage::BodyParsed);

        credentials
            .validate()
            .map_err(|errors| LoginFailure::ValidationFailed(joined_violations(&errors)))?;
        trace_stage(LoginStage::FieldsValidated);

        let authentication = self
            .credential_verifier
            .verify(&credentials.identifier, &credentials.secret)
            .await?;
        trace_stage(LoginStage::CredentialsVerified);

        let token = self
            .token_codec
            .issue(&authentication.identity, &authentication.authorities)?;
        trace_stage(LoginStage::TokenIssued);

        tracing::info!(
            target: TRACING_TARGET,
            identity = %authentication.identity,
            expires_at = %token.expires_at(),
            "login succeeded"
        );

        Ok(token)
    }
}

impl FromRef<ServiceState> for LoginInterceptor {
    fn from_ref(state: &ServiceState) -> Self {
        Self::new(
            SharedCredentialVerifier::from_ref(state),
            TokenCodec::from_ref(state),
        )
    }
}

impl std::fmt::Debug for LoginInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginInterceptor")
            .field("token_codec", &self.token_codec)
            .finish_non_exhaustive()
    }
}

fn trace_stage(stage: LoginStage) {
    tracing::trace!(target: TRACING_TARGET, stage = %stage, "login stage reached");
}

/// Joins every violation message, ordered by field.
fn joined_violations(errors: &ValidationErrors) -> String {
    let fields: BTreeMap<_, _> = errors.field_errors().into_iter().collect();

    fields
        .values()
        .flat_map(|field_errors| field_errors.iter())
        .map(|error| match &error.message {
            Some(message) => message.to_string(),
            None => error.code.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Intercepts `POST /api/v1/login` and answers it.
pub async fn login_interceptor(
    State(interceptor): State<LoginInterceptor>,
    request: Request,
    next: Next,
) -> Response {
    if !LoginInterceptor::intercepts(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    let context = SecurityContext::from_extensions(request.extensions());
    let (parts, body) = request.into_parts();

    match interceptor.attempt(&context, &parts.headers, body).await {
        Ok(token) => on_login_success(token),
        Err(failure) => on_login_failure(failure),
    }
}
