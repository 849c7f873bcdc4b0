//! Application state and dependency injection.

mod config;
mod security;
mod state;
mod store;

pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder, ServiceConfigBuilderError};
pub use crate::service::security::{
    ACCESS_TOKEN_SUBJECT, AUTHORITY_USER, AccessClaims, AccessToken, Authentication,
    BEARER_PREFIX, CredentialError, CredentialVerifier, PasswordHasher, Principal,
    StoreCredentialVerifier, TokenCodec, TokenError, TokenErrorKind,
};
pub use crate::service::state::{ServiceState, SharedCredentialVerifier};
pub use crate::service::store::{
    Article, ArticleRepository, ArticleStore, MemoryStore, NewArticle, NewUser, User,
    UserRepository, UserStore,
};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};
