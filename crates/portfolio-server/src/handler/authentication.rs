//! Account registration.
//!
//! Login has no handler here: `POST /api/v1/login` is answered by the
//! [`login_interceptor`] before routing.
//!
//! [`login_interceptor`]: crate::middleware::login_interceptor

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;

use crate::extract::{Json, ValidateJson};
use crate::handler::request::Signup;
use crate::handler::response::SignupResponse;
use crate::handler::{ErrorKind, Result, message};
use crate::service::{PasswordHasher, ServiceState, UserStore};
use crate::utility::tracing_targets::TRACING_TARGET_SIGNUP as TRACING_TARGET;

/// Registers a new account.
#[tracing::instrument(skip_all)]
async fn signup(
    State(users): State<UserStore>,
    State(password_hasher): State<PasswordHasher>,
    ValidateJson(request): ValidateJson<Signup>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        email = %request.email,
        user_id = %request.user_id,
        "signup attempt"
    );

    if users.exists_by_email(&request.email).await? {
        tracing::warn!(
            target: TRACING_TARGET,
            email = %request.email,
            "signup failed: email already exists"
        );
        return Err(ErrorKind::Conflict.with_detail(message::DUPLICATE_EMAIL));
    }

    if users.exists_by_user_id(&request.user_id).await? {
        tracing::warn!(
            target: TRACING_TARGET,
            user_id = %request.user_id,
            "signup failed: user id already exists"
        );
        return Err(ErrorKind::Conflict.with_detail(message::DUPLICATE_USER_ID));
    }

    let password_hash = password_hasher.hash_password(&request.password)?;
    let user = users.save_user(request.into_model(password_hash)).await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %user.id,
        user_id = %user.user_id,
        "account created"
    );

    let response = SignupResponse {
        message: message::CREATED.to_owned(),
        detail: message::SUCCESS_SIGNUP.to_owned(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/api/v1/signup", post(signup))
}

#[cfg(test)]
mod test {
    use axum::http::{HeaderName, HeaderValue};
    use serde_json::{Value, json};

    use super::*;
    use crate::handler::test::{
        TEST_EMAIL, TEST_PASSWORD, create_test_server, signup_and_login, signup_request,
    };

    fn bearer(token: &str) -> anyhow::Result<HeaderValue> {
        Ok(HeaderValue::from_str(&format!("Bearer {token}"))?)
    }

    #[tokio::test]
    async fn signup_success() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.post("/api/v1/signup").json(&signup_request()).await;
        response.assert_status(StatusCode::CREATED);

        let body: SignupResponse = response.json();
        assert_eq!(body.message, message::CREATED);
        Ok(())
    }

    #[tokio::test]
    async fn signup_duplicate_email() -> anyhow::Result<()> {
        let server = create_test_server()?;
        server.post("/api/v1/signup").json(&signup_request()).await;

        let mut request = signup_request();
        request["userId"] = json!("otherId");

        let response = server.post("/api/v1/signup").json(&request).await;
        response.assert_status_conflict();

        let body: Value = response.json();
        assert_eq!(body["detail"], message::DUPLICATE_EMAIL);
        Ok(())
    }

    #[tokio::test]
    async fn signup_duplicate_user_id() -> anyhow::Result<()> {
        let server = create_test_server()?;
        server.post("/api/v1/signup").json(&signup_request()).await;

        let mut request = signup_request();
        request["email"] = json!("other@test.kr");

        let response = server.post("/api/v1/signup").json(&request).await;
        response.assert_status_conflict();

        let body: Value = response.json();
        assert_eq!(body["detail"], message::DUPLICATE_USER_ID);
        Ok(())
    }

    #[tokio::test]
    async fn signup_invalid_fields() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let mut request = signup_request();
        request["userId"] = json!("id1");
        request["phone"] = json!("01012345678");

        let response = server.post("/api/v1/signup").json(&request).await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert_eq!(body["message"], message::BAD_REQUEST);
        assert!(body["details"]["userId"].is_string());
        assert!(body["details"]["phone"].is_string());
        assert!(body["details"].get("email").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn signup_while_logged_in_is_forbidden() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let token = signup_and_login(&server).await?;

        let mut request = signup_request();
        request["userId"] = json!("otherId");
        request["email"] = json!("other@test.kr");

        let response = server
            .post("/api/v1/signup")
            .add_header(HeaderName::from_static("authorization"), bearer(&token)?)
            .json(&request)
            .await;
        response.assert_status_forbidden();

        let body: Value = response.json();
        assert_eq!(body["detail"], message::ALREADY_LOGIN);
        Ok(())
    }

    #[tokio::test]
    async fn login_success() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let token = signup_and_login(&server).await?;

        assert!(!token.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn login_requires_json_content_type() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let body = json!({"email": TEST_EMAIL, "password": TEST_PASSWORD}).to_string();
        let response = server
            .post("/api/v1/login")
            .text(body)
            .content_type("text/plain")
            .await;
        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let body: Value = response.json();
        assert_eq!(body["detail"], message::ONLY_SUPPORTED_APPLICATION_JSON);
        Ok(())
    }

    #[tokio::test]
    async fn login_while_logged_in_is_forbidden() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let token = signup_and_login(&server).await?;

        let response = server
            .post("/api/v1/login")
            .add_header(HeaderName::from_static("authorization"), bearer(&token)?)
            .json(&json!({"email": TEST_EMAIL, "password": TEST_PASSWORD}))
            .await;
        response.assert_status_forbidden();

        let body: Value = response.json();
        assert_eq!(body["detail"], message::ALREADY_LOGIN);
        Ok(())
    }

    #[tokio::test]
    async fn login_invalid_fields() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/api/v1/login")
            .json(&json!({"email": "not-an-email", "password": TEST_PASSWORD}))
            .await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert!(body["detail"].as_str().is_some_and(|d| d.contains("Email")));
        Ok(())
    }

    #[tokio::test]
    async fn login_secret_breaking_the_password_rule_is_rejected() -> anyhow::Result<()> {
        let server = create_test_server()?;
        signup_and_login(&server).await?;

        let response = server
            .post("/api/v1/login")
            .json(&json!({"email": TEST_EMAIL, "password": "abcdefghij"}))
            .await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert!(body["detail"].as_str().is_some_and(|d| d.contains("Password")));
        Ok(())
    }

    #[tokio::test]
    async fn login_malformed_body() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/api/v1/login")
            .text("{\"email\":")
            .content_type("application/json")
            .await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert_eq!(body["detail"], message::MALFORMED_BODY);
        Ok(())
    }

    #[tokio::test]
    async fn login_wrong_password_and_unknown_email_look_alike() -> anyhow::Result<()> {
        let server = create_test_server()?;
        signup_and_login(&server).await?;

        let wrong_password = server
            .post("/api/v1/login")
            .json(&json!({"email": TEST_EMAIL, "password": "wrongpass1!!"}))
            .await;
        wrong_password.assert_status_unauthorized();

        let unknown_email = server
            .post("/api/v1/login")
            .json(&json!({"email": "nobody@test.kr", "password": TEST_PASSWORD}))
            .await;
        unknown_email.assert_status_unauthorized();

        let wrong_password: Value = wrong_password.json();
        let unknown_email: Value = unknown_email.json();
        assert_eq!(wrong_password["detail"], message::CREDENTIALS_MISMATCH);
        assert_eq!(wrong_password, unknown_email);
        Ok(())
    }

    #[tokio::test]
    async fn login_with_invalid_token_is_still_anonymous() -> anyhow::Result<()> {
        let server = create_test_server()?;
        signup_and_login(&server).await?;

        let response = server
            .post("/api/v1/login")
            .add_header(
                HeaderName::from_static("authorization"),
                HeaderValue::from_static("Bearer not-a-token"),
            )
            .json(&json!({"email": TEST_EMAIL, "password": TEST_PASSWORD}))
            .await;
        response.assert_status_ok();
        Ok(())
    }
}
