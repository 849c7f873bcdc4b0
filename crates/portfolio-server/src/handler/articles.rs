//! Article handlers.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;

use crate::extract::{Authenticated, Json, ValidateJson};
use crate::handler::request::CreateArticle;
use crate::handler::response::ArticleCreated;
use crate::handler::{ErrorKind, Result, message};
use crate::service::{ArticleStore, ServiceState, UserStore};
use crate::utility::tracing_targets::TRACING_TARGET_ARTICLES as TRACING_TARGET;

/// Publishes an article written by the authenticated account.
#[tracing::instrument(skip_all)]
async fn create_article(
    State(users): State<UserStore>,
    State(articles): State<ArticleStore>,
    Authenticated(authentication): Authenticated,
    ValidateJson(request): ValidateJson<CreateArticle>,
) -> Result<(StatusCode, Json<ArticleCreated>)> {
    let Some(writer) = users.find_user_by_email(&authentication.identity).await? else {
        tracing::warn!(
            target: TRACING_TARGET,
            identity = %authentication.identity,
            "article writer no longer exists"
        );
        return Err(ErrorKind::NotFound.with_detail(message::USER_NOT_FOUND));
    };

    let article = articles.save_article(request.into_model(writer.id)).await?;

    tracing::info!(
        target: TRACING_TARGET,
        article_id = %article.id,
        writer_id = %article.writer_id,
        "article created"
    );

    let response = ArticleCreated {
        message: message::CREATED.to_owned(),
        detail: message::SUCCESS_CREATE.to_owned(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/api/v1/articles", post(create_article))
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use axum::http::{HeaderName, HeaderValue};
    use serde_json::{Value, json};

    use super::*;
    use crate::handler::test::{
        create_test_server, create_test_server_with_state, signup_and_login, test_config,
    };

    fn authorization() -> HeaderName {
        HeaderName::from_static("authorization")
    }

    fn article_request() -> Value {
        json!({"title": "First article", "contents": "Hello, world."})
    }

    #[tokio::test]
    async fn create_article_success() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let token = signup_and_login(&server).await?;

        let response = server
            .post("/api/v1/articles")
            .add_header(
                authorization(),
                HeaderValue::from_str(&format!("Bearer {token}"))?,
            )
            .json(&article_request())
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: ArticleCreated = response.json();
        assert_eq!(body.message, message::CREATED);
        assert_eq!(body.detail, message::SUCCESS_CREATE);
        Ok(())
    }

    #[tokio::test]
    async fn create_article_without_token_is_unauthorized() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.post("/api/v1/articles").json(&article_request()).await;
        response.assert_status_unauthorized();

        let body: Value = response.json();
        assert_eq!(body["message"], message::UNAUTHORIZED);
        assert_eq!(body["detail"], message::NOT_LOGGED_IN);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_and_missing_tokens_look_alike() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let missing = server.post("/api/v1/articles").json(&article_request()).await;
        let malformed = server
            .post("/api/v1/articles")
            .add_header(authorization(), HeaderValue::from_static("Bearer abc.def.ghi"))
            .json(&article_request())
            .await;
        malformed.assert_status_unauthorized();

        let missing: Value = missing.json();
        let malformed: Value = malformed.json();
        assert_eq!(missing, malformed);
        Ok(())
    }

    #[tokio::test]
    async fn token_signed_with_other_key_is_unauthorized() -> anyhow::Result<()> {
        let server = create_test_server()?;
        signup_and_login(&server).await?;

        let other = crate::service::TokenCodec::new(
            "YW5vdGhlci10ZXN0LXNpZ25pbmcta2V5LXVzZWQtZm9yLW1pc21hdGNoLWNoZWNrcw==",
            "Authorization",
            std::time::Duration::from_secs(3600),
        )?;
        let forged = other.issue("test@test.kr", &BTreeSet::from(["USER".to_owned()]))?;

        let response = server
            .post("/api/v1/articles")
            .add_header(
                authorization(),
                HeaderValue::from_str(&format!("Bearer {}", forged.as_str()))?,
            )
            .json(&article_request())
            .await;
        response.assert_status_unauthorized();
        Ok(())
    }

    #[tokio::test]
    async fn create_article_invalid_fields() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let token = signup_and_login(&server).await?;

        let response = server
            .post("/api/v1/articles")
            .add_header(
                authorization(),
                HeaderValue::from_str(&format!("Bearer {token}"))?,
            )
            .json(&json!({"title": " ", "contents": "a".repeat(1001)}))
            .await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert!(body["details"]["title"].is_string());
        assert!(body["details"]["contents"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn token_for_removed_account_is_not_found() -> anyhow::Result<()> {
        let state = ServiceState::from_config(&test_config()?)?;
        let token = state
            .token_codec()
            .issue("ghost@test.kr", &BTreeSet::from(["USER".to_owned()]))?;
        let server = create_test_server_with_state(state)?;

        let response = server
            .post("/api/v1/articles")
            .add_header(
                authorization(),
                HeaderValue::from_str(&format!("Bearer {}", token.as_str()))?,
            )
            .json(&article_request())
            .await;
        response.assert_status_not_found();

        let body: Value = response.json();
        assert_eq!(body["detail"], message::USER_NOT_FOUND);
        Ok(())
    }
}
