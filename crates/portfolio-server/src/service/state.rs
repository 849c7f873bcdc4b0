//! Application state and dependency injection.

use std::sync::Arc;

use crate::middleware::AccessPolicy;
use crate::service::{
    ArticleStore, CredentialVerifier, PasswordHasher, Result, ServiceConfig,
    StoreCredentialVerifier, TokenCodec, UserStore,
};

/// Shared handle to the credential verifier used by the login flow.
pub type SharedCredentialVerifier = Arc<dyn CredentialVerifier>;

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    users: UserStore,
    articles: ArticleStore,

    token_codec: TokenCodec,
    password_hasher: PasswordHasher,
    credential_verifier: SharedCredentialVerifier,
    access_policy: AccessPolicy,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Loads the token signing key, builds the password hasher and opens
    /// the store.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let store = config.open_store();
        let users: UserStore = Arc::new(store.clone());
        let articles: ArticleStore = Arc::new(store);

        let password_hasher = config.create_password_hasher()?;
        let credential_verifier =
            StoreCredentialVerifier::new(users.clone(), password_hasher.clone());

        let service_state = Self {
            users,
            articles,

            token_codec: config.create_token_codec()?,
            password_hasher,
            credential_verifier: Arc::new(credential_verifier),
            access_policy: AccessPolicy::default(),
        };

        Ok(service_state)
    }

    /// Replaces the credential verifier used by the login flow.
    pub fn with_credential_verifier(
        mut self,
        credential_verifier: impl CredentialVerifier + 'static,
    ) -> Self {
        self.credential_verifier = Arc::new(credential_verifier);
        self
    }

    /// Replaces the route access policy.
    pub fn with_access_policy(mut self, access_policy: AccessPolicy) -> Self {
        self.access_policy = access_policy;
        self
    }

    /// Returns the user repository.
    #[inline]
    pub fn users(&self) -> &UserStore {
        &self.users
    }

    /// Returns the token codec.
    #[inline]
    pub fn token_codec(&self) -> &TokenCodec {
        &self.token_codec
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(users: UserStore);
impl_di!(articles: ArticleStore);

impl_di!(token_codec: TokenCodec);
impl_di!(password_hasher: PasswordHasher);
impl_di!(credential_verifier: SharedCredentialVerifier);
impl_di!(access_policy: AccessPolicy);
