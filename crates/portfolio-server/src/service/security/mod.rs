//! Token signing, password hashing and credential verification.

mod credential_verifier;
mod password_hasher;
mod token_codec;

pub use credential_verifier::{
    Authentication, CredentialError, CredentialVerifier, Principal, StoreCredentialVerifier,
};
pub use password_hasher::PasswordHasher;
pub use token_codec::{
    ACCESS_TOKEN_SUBJECT, AccessClaims, AccessToken, BEARER_PREFIX, TokenCodec, TokenError,
    TokenErrorKind,
};

/// The single authority granted to every registered account.
pub const AUTHORITY_USER: &str = "USER";
