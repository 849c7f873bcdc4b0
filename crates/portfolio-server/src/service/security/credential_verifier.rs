//! Credential verification against the user store.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::service::security::PasswordHasher;
use crate::service::store::{User, UserRepository};
use crate::utility::tracing_targets::TRACING_TARGET_LOGIN as TRACING_TARGET;

/// Identity and authorities established for a request or a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authentication {
    pub identity: String,
    pub authorities: BTreeSet<String>,
}

impl Authentication {
    /// Creates a new [`Authentication`].
    pub fn new(identity: impl Into<String>, authorities: BTreeSet<String>) -> Self {
        Self {
            identity: identity.into(),
            authorities,
        }
    }

    /// Returns whether `authority` was granted.
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

/// A registered identity as seen by the authentication core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub identifier: String,
    pub secret_hash: String,
    pub authorities: BTreeSet<String>,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        let authorities = user.authorities();
        Self {
            identifier: user.email,
            secret_hash: user.password_hash,
            authorities,
        }
    }
}

/// Failure to verify a set of credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// No principal is registered under the identifier.
    #[error("no principal registered for the identifier")]
    NotFound,
    /// The submitted secret does not match the stored hash.
    #[error("submitted secret does not match the stored hash")]
    Mismatch,
    /// The store or the hasher failed.
    #[error(transparent)]
    Internal(#[from] crate::Error),
}

/// Looks up a principal and checks a submitted secret against it.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verifies `secret` for the principal registered as `identifier`.
    async fn verify(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Authentication, CredentialError>;
}

/// [`CredentialVerifier`] backed by the user store and Argon2id hashes.
#[derive(Clone)]
pub struct StoreCredentialVerifier {
    users: Arc<dyn UserRepository>,
    password_hasher: PasswordHasher,
}

impl StoreCredentialVerifier {
    /// Creates a new [`StoreCredentialVerifier`].
    pub fn new(users: Arc<dyn UserRepository>, password_hasher: PasswordHasher) -> Self {
        Self {
            users,
            password_hasher,
        }
    }
}

#[async_trait]
impl CredentialVerifier for StoreCredentialVerifier {
    async fn verify(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Authentication, CredentialError> {
        let Some(user) = self.users.find_user_by_email(identifier).await? else {
            // Equalize timing with the found-but-wrong-secret path.
            self.password_hasher.verify_dummy_password(secret);

            tracing::debug!(
                target: TRACING_TARGET,
                "no principal registered for identifier"
            );
            return Err(CredentialError::NotFound);
        };

        let principal = Principal::from(user);
        if !self
            .password_hasher
            .verify_password(secret, &principal.secret_hash)?
        {
            tracing::debug!(
                target: TRACING_TARGET,
                "submitted secret does not match stored hash"
            );
            return Err(CredentialError::Mismatch);
        }

        Ok(Authentication::new(principal.identifier, principal.authorities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::store::{MemoryStore, NewUser};

    async fn verifier_with_user() -> anyhow::Result<StoreCredentialVerifier> {
        let store = MemoryStore::new();
        let hasher = PasswordHasher::with_params(1024, 1, 1)?;

        store
            .save_user(NewUser {
                user_id: "testId".to_owned(),
                username: "테스트".to_owned(),
                email: "test@test.kr".to_owned(),
                phone: "010-1234-5678".to_owned(),
                password_hash: hasher.hash_password("q1w2e3r4t5!@")?,
            })
            .await?;

        Ok(StoreCredentialVerifier::new(Arc::new(store), hasher))
    }

    #[tokio::test]
    async fn matching_secret_yields_authentication() -> anyhow::Result<()> {
        let verifier = verifier_with_user().await?;

        let authentication = verifier.verify("test@test.kr", "q1w2e3r4t5!@").await?;
        assert_eq!(authentication.identity, "test@test.kr");
        assert!(authentication.has_authority("USER"));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_secret_yields_mismatch() -> anyhow::Result<()> {
        let verifier = verifier_with_user().await?;

        let error = verifier
            .verify("test@test.kr", "wrongpass1!!")
            .await
            .unwrap_err();
        assert!(matches!(error, CredentialError::Mismatch));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_identifier_yields_not_found() -> anyhow::Result<()> {
        let verifier = verifier_with_user().await?;

        let error = verifier
            .verify("nobody@test.kr", "q1w2e3r4t5!@")
            .await
            .unwrap_err();
        assert!(matches!(error, CredentialError::NotFound));
        Ok(())
    }
}
