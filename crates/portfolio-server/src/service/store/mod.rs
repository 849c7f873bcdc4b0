//! User and article persistence.
//!
//! Handlers and the credential verifier talk to the store through the
//! [`UserRepository`] and [`ArticleRepository`] traits. [`MemoryStore`] is
//! the bundled implementation.

mod memory;

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use uuid::Uuid;

pub use self::memory::MemoryStore;
use crate::Result;
use crate::service::security::AUTHORITY_USER;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    /// Login handle chosen at signup (letters only).
    pub user_id: String,
    /// Display name.
    pub username: String,
    /// Email address, also the login identifier.
    pub email: String,
    pub phone: String,
    /// Argon2id hash in PHC string format.
    pub password_hash: String,
    pub created_at: Timestamp,
}

impl User {
    /// Returns the authorities granted to this account.
    pub fn authorities(&self) -> BTreeSet<String> {
        BTreeSet::from([AUTHORITY_USER.to_owned()])
    }
}

/// Data required to register an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

/// A published article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: Uuid,
    /// Account that wrote the article.
    pub writer_id: Uuid,
    pub title: String,
    pub contents: String,
    pub created_at: Timestamp,
}

/// Data required to publish an article.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub writer_id: Uuid,
    pub title: String,
    pub contents: String,
}

/// Account lookups and registration.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds an account by email address.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Returns whether an account uses `email`.
    async fn exists_by_email(&self, email: &str) -> Result<bool>;

    /// Returns whether an account uses `user_id`.
    async fn exists_by_user_id(&self, user_id: &str) -> Result<bool>;

    /// Persists a new account.
    async fn save_user(&self, new_user: NewUser) -> Result<User>;
}

/// Article persistence.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Persists a new article.
    async fn save_article(&self, new_article: NewArticle) -> Result<Article>;
}

/// Shared handle to the user repository.
pub type UserStore = Arc<dyn UserRepository>;

/// Shared handle to the article repository.
pub type ArticleStore = Arc<dyn ArticleRepository>;
