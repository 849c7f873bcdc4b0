//! In-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Article, ArticleRepository, NewArticle, NewUser, User, UserRepository};
use crate::utility::tracing_targets::TRACING_TARGET_STORE as TRACING_TARGET;
use crate::{Error, Result};

/// Store keeping users and articles in process memory.
///
/// Cloning yields another handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    users: HashMap<Uuid, User>,
    user_ids_by_email: HashMap<String, Uuid>,
    user_ids_by_handle: HashMap<String, Uuid>,
    articles: Vec<Article>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        let user = inner
            .user_ids_by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned();

        Ok(user)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self.inner.read().await.user_ids_by_email.contains_key(email))
    }

    async fn exists_by_user_id(&self, user_id: &str) -> Result<bool> {
        Ok(self.inner.read().await.user_ids_by_handle.contains_key(user_id))
    }

    async fn save_user(&self, new_user: NewUser) -> Result<User> {
        let mut inner = self.inner.write().await;

        // Uniqueness is re-checked under the write lock.
        if inner.user_ids_by_email.contains_key(&new_user.email) {
            return Err(Error::store("email is already registered"));
        }
        if inner.user_ids_by_handle.contains_key(&new_user.user_id) {
            return Err(Error::store("user id is already registered"));
        }

        let user = User {
            id: Uuid::now_v7(),
            user_id: new_user.user_id,
            username: new_user.username,
            email: new_user.email,
            phone: new_user.phone,
            password_hash: new_user.password_hash,
            created_at: Timestamp::now(),
        };

        inner.user_ids_by_email.insert(user.email.clone(), user.id);
        inner.user_ids_by_handle.insert(user.user_id.clone(), user.id);
        inner.users.insert(user.id, user.clone());

        tracing::debug!(
            target: TRACING_TARGET,
            user_id = %user.id,
            "user saved"
        );

        Ok(user)
    }
}

#[async_trait]
impl ArticleRepository for MemoryStore {
    async fn save_article(&self, new_article: NewArticle) -> Result<Article> {
        let mut inner = self.inner.write().await;

        if !inner.users.contains_key(&new_article.writer_id) {
            return Err(Error::store("article writer does not exist"));
        }

        let article = Article {
            id: Uuid::now_v7(),
            writer_id: new_article.writer_id,
            title: new_article.title,
            contents: new_article.contents,
            created_at: Timestamp::now(),
        };

        inner.articles.push(article.clone());

        tracing::debug!(
            target: TRACING_TARGET,
            article_id = %article.id,
            writer_id = %article.writer_id,
            "article saved"
        );

        Ok(article)
    }
}
