//! Access token issuance and verification.
//!
//! Tokens are HS256-signed JWTs carrying the account email and a
//! comma-joined authority list. The signing key is a base64-encoded
//! symmetric secret loaded once at startup and shared read-only.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::service::config::MIN_SECRET_KEY_BYTES;
use crate::utility::tracing_targets::TRACING_TARGET_TOKEN_CODEC as TRACING_TARGET;
use crate::{Error, Result};

/// Fixed `sub` claim of every access token.
pub const ACCESS_TOKEN_SUBJECT: &str = "AccessToken";

/// Literal prefix of the token-bearing header value.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Separator used to join authorities into the `auth` claim.
const AUTHORITY_SEPARATOR: char = ',';

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Always [`ACCESS_TOKEN_SUBJECT`].
    pub sub: String,
    /// Identity (account email) the token was issued for.
    pub email: String,
    /// Comma-joined authorities.
    pub auth: String,
    /// Issued at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expires at, seconds since the Unix epoch.
    pub exp: i64,
}

impl AccessClaims {
    /// Returns the identity the token was issued for.
    #[inline]
    pub fn identity(&self) -> &str {
        &self.email
    }

    /// Splits the `auth` claim back into an authority set.
    pub fn authorities(&self) -> BTreeSet<String> {
        self.auth
            .split(AUTHORITY_SEPARATOR)
            .map(str::trim)
            .filter(|authority| !authority.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// A freshly issued, signed access token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    issued_at: Timestamp,
    expires_at: Timestamp,
}

impl AccessToken {
    /// Returns the encoded token.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Consumes the token and returns its encoded form.
    #[inline]
    pub fn into_string(self) -> String {
        self.token
    }

    /// Returns the issue time.
    #[inline]
    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }

    /// Returns the expiry time.
    #[inline]
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Reason a token failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum TokenErrorKind {
    /// The signature does not match the header and payload.
    BadSignature,
    /// The token is not a well-formed JWT or its claims are invalid.
    Malformed,
    /// The token's `exp` is in the past.
    Expired,
    /// The token uses an algorithm this codec does not accept.
    UnsupportedFormat,
    /// No token was present after the `Bearer ` prefix.
    Missing,
}

/// Token verification failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} token: {message}")]
pub struct TokenError {
    kind: TokenErrorKind,
    message: Cow<'static, str>,
}

impl TokenError {
    /// Creates a new [`TokenError`].
    pub fn new(kind: TokenErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> TokenErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<JwtError> for TokenError {
    fn from(error: JwtError) -> Self {
        let kind = match error.kind() {
            JwtErrorKind::InvalidSignature => TokenErrorKind::BadSignature,
            JwtErrorKind::ExpiredSignature => TokenErrorKind::Expired,
            JwtErrorKind::InvalidAlgorithm
            | JwtErrorKind::InvalidAlgorithmName
            | JwtErrorKind::MissingAlgorithm => TokenErrorKind::UnsupportedFormat,
            _ => TokenErrorKind::Malformed,
        };

        Self::new(kind, error.to_string())
    }
}

/// Creates and verifies signed access tokens.
///
/// Cheap to clone: key material is shared behind an [`Arc`].
#[derive(Clone)]
pub struct TokenCodec {
    inner: Arc<TokenCodecInner>,
}

struct TokenCodecInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    header_name: HeaderName,
    ttl: SignedDuration,
}

impl TokenCodec {
    /// Creates a codec from a base64-encoded secret.
    ///
    /// # Errors
    ///
    /// Fails if the secret is not base64, decodes to fewer than 32 bytes,
    /// the header name is invalid, or the round-trip key check fails.
    pub fn new(secret_base64: &str, header_name: &str, ttl: Duration) -> Result<Self> {
        let secret_base64 = secret_base64.trim();
        let secret = BASE64
            .decode(secret_base64)
            .map_err(|e| Error::config("JWT secret key is not valid base64").with_source(e))?;

        if secret.len() < MIN_SECRET_KEY_BYTES {
            return Err(Error::config(format!(
                "JWT secret key must decode to at least {} bytes",
                MIN_SECRET_KEY_BYTES
            )));
        }

        let header_name = HeaderName::try_from(header_name.trim())
            .map_err(|e| Error::config("invalid JWT access header name").with_source(e))?;

        let ttl = i64::try_from(ttl.as_secs())
            .map(SignedDuration::from_secs)
            .map_err(|e| Error::config("JWT access expiration is too large").with_source(e))?;

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.sub = Some(ACCESS_TOKEN_SUBJECT.to_owned());

        let inner = TokenCodecInner {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            validation,
            header_name,
            ttl,
        };

        let codec = Self {
            inner: Arc::new(inner),
        };

        codec.validate_keys()?;

        tracing::info!(
            target: TRACING_TARGET,
            header = %codec.header_name(),
            ttl_secs = codec.inner.ttl.as_secs(),
            "token signing key loaded",
        );

        Ok(codec)
    }

    /// Returns the header the bearer token is read from.
    #[inline]
    pub fn header_name(&self) -> &HeaderName {
        &self.inner.header_name
    }

    /// Returns the configured token lifetime.
    #[inline]
    pub fn ttl(&self) -> SignedDuration {
        self.inner.ttl
    }

    /// Issues a token for `identity`, stamped with the current time.
    pub fn issue(&self, identity: &str, authorities: &BTreeSet<String>) -> Result<AccessToken> {
        self.issue_at(identity, authorities, Timestamp::now())
    }

    /// Issues a token for `identity` as if it had been issued at `issued_at`.
    ///
    /// The expiry is always `issued_at + ttl`.
    pub fn issue_at(
        &self,
        identity: &str,
        authorities: &BTreeSet<String>,
        issued_at: Timestamp,
    ) -> Result<AccessToken> {
        let expires_at = issued_at
            .checked_add(self.inner.ttl)
            .map_err(|e| Error::internal("token_codec", "token expiry overflow").with_source(e))?;

        let auth = authorities
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(&AUTHORITY_SEPARATOR.to_string());

        let claims = AccessClaims {
            sub: ACCESS_TOKEN_SUBJECT.to_owned(),
            email: identity.to_owned(),
            auth,
            iat: issued_at.as_second(),
            exp: expires_at.as_second(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.inner.encoding_key)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "failed to sign access token",
                );
                Error::auth("failed to sign access token").with_source(e)
            })?;

        Ok(AccessToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Verifies the signature and expiry of `token` and returns its claims.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::new(TokenErrorKind::Missing, "empty token"));
        }

        let data = decode::<AccessClaims>(token, &self.inner.decoding_key, &self.inner.validation)?;
        Ok(data.claims)
    }

    /// Returns the token part of a header value starting with `"Bearer "`.
    ///
    /// Anything else, including an absent header, yields `None`.
    pub fn extract_bearer(header_value: Option<&str>) -> Option<&str> {
        header_value?.strip_prefix(BEARER_PREFIX)
    }

    /// Round-trips a throwaway token to make sure the key pair is usable.
    fn validate_keys(&self) -> Result<()> {
        let authorities = BTreeSet::from(["SELF_CHECK".to_owned()]);
        let token = self.issue("self-check", &authorities)?;

        self.verify(token.as_str()).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "key validation failed during decoding",
            );
            Error::auth("key validation decoding failed").with_source(e)
        })?;

        tracing::debug!(target: TRACING_TARGET, "key validation successful");
        Ok(())
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("header_name", &self.inner.header_name)
            .field("ttl", &self.inner.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "cG9ydGZvbGlvLXRlc3Qtc2lnbmluZy1rZXktd2l0aC1hdC1sZWFzdC0zMi1ieXRlcw==";
    const OTHER_SECRET: &str = "YW5vdGhlci10ZXN0LXNpZ25pbmcta2V5LXVzZWQtZm9yLW1pc21hdGNoLWNoZWNrcw==";

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(secret, "Authorization", Duration::from_secs(3600))
            .expect("test secret is valid")
    }

    fn user_authorities() -> BTreeSet<String> {
        BTreeSet::from(["USER".to_owned()])
    }

    #[test]
    fn issue_then_verify_round_trips_identity_and_authorities() -> anyhow::Result<()> {
        let codec = codec(TEST_SECRET);
        let authorities = BTreeSet::from(["ADMIN".to_owned(), "USER".to_owned()]);

        let token = codec.issue("test@test.kr", &authorities)?;
        let claims = codec.verify(token.as_str())?;

        assert_eq!(claims.identity(), "test@test.kr");
        assert_eq!(claims.authorities(), authorities);
        assert_eq!(claims.sub, ACCESS_TOKEN_SUBJECT);
        assert_eq!(claims.auth, "ADMIN,USER");
        Ok(())
    }

    #[test]
    fn expiry_is_issue_time_plus_ttl() -> anyhow::Result<()> {
        let codec = codec(TEST_SECRET);
        let issued_at = Timestamp::now();

        let token = codec.issue_at("test@test.kr", &user_authorities(), issued_at)?;
        let claims = codec.verify(token.as_str())?;

        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(token.expires_at().as_second(), claims.exp);
        Ok(())
    }

    #[test]
    fn issuing_is_deterministic_for_same_instant() -> anyhow::Result<()> {
        let codec = codec(TEST_SECRET);
        let issued_at = Timestamp::now();

        let first = codec.issue_at("test@test.kr", &user_authorities(), issued_at)?;
        let second = codec.issue_at("test@test.kr", &user_authorities(), issued_at)?;

        assert_eq!(first.as_str(), second.as_str());
        Ok(())
    }

    #[test]
    fn expired_token_fails_with_expired() -> anyhow::Result<()> {
        let codec = codec(TEST_SECRET);
        let issued_at = Timestamp::now().checked_sub(SignedDuration::from_hours(2))?;

        let token = codec.issue_at("test@test.kr", &user_authorities(), issued_at)?;
        let error = codec.verify(token.as_str()).unwrap_err();

        assert_eq!(error.kind(), TokenErrorKind::Expired);
        Ok(())
    }

    #[test]
    fn tampered_signature_fails_verification() -> anyhow::Result<()> {
        let codec = codec(TEST_SECRET);
        let token = codec.issue("test@test.kr", &user_authorities())?.into_string();

        let signature_start = token.rfind('.').expect("jwt has three segments") + 1;
        let mut bytes = token.into_bytes();
        bytes[signature_start] = if bytes[signature_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes)?;

        let error = codec.verify(&tampered).unwrap_err();
        assert_eq!(error.kind(), TokenErrorKind::BadSignature);
        Ok(())
    }

    #[test]
    fn tampered_payload_fails_verification() -> anyhow::Result<()> {
        let codec = codec(TEST_SECRET);
        let token = codec.issue("test@test.kr", &user_authorities())?.into_string();
        let other = codec.issue("evil@test.kr", &user_authorities())?.into_string();

        let segments: Vec<&str> = token.split('.').collect();
        let other_segments: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", segments[0], other_segments[1], segments[2]);

        assert!(codec.verify(&forged).is_err());
        Ok(())
    }

    #[test]
    fn token_signed_with_other_key_fails_with_bad_signature() -> anyhow::Result<()> {
        let token = codec(OTHER_SECRET).issue("test@test.kr", &user_authorities())?;
        let error = codec(TEST_SECRET).verify(token.as_str()).unwrap_err();

        assert_eq!(error.kind(), TokenErrorKind::BadSignature);
        Ok(())
    }

    #[test]
    fn token_with_other_algorithm_fails_with_unsupported_format() -> anyhow::Result<()> {
        let claims = AccessClaims {
            sub: ACCESS_TOKEN_SUBJECT.to_owned(),
            email: "test@test.kr".to_owned(),
            auth: "USER".to_owned(),
            iat: Timestamp::now().as_second(),
            exp: Timestamp::now().as_second() + 3600,
        };
        let key = EncodingKey::from_base64_secret(TEST_SECRET)?;
        let token = encode(&Header::new(Algorithm::HS512), &claims, &key)?;

        let error = codec(TEST_SECRET).verify(&token).unwrap_err();
        assert_eq!(error.kind(), TokenErrorKind::UnsupportedFormat);
        Ok(())
    }

    #[test]
    fn garbage_token_fails_with_malformed() {
        let error = codec(TEST_SECRET).verify("not-a-jwt").unwrap_err();
        assert_eq!(error.kind(), TokenErrorKind::Malformed);
    }

    #[test]
    fn empty_token_fails_with_missing() {
        let error = codec(TEST_SECRET).verify("").unwrap_err();
        assert_eq!(error.kind(), TokenErrorKind::Missing);
    }

    #[test]
    fn extract_bearer_requires_exact_prefix() {
        assert_eq!(TokenCodec::extract_bearer(Some("Bearer abc.def")), Some("abc.def"));
        assert_eq!(TokenCodec::extract_bearer(Some("Bearer ")), Some(""));
        assert_eq!(TokenCodec::extract_bearer(Some("bearer abc")), None);
        assert_eq!(TokenCodec::extract_bearer(Some("Basic dXNlcg==")), None);
        assert_eq!(TokenCodec::extract_bearer(None), None);
    }

    #[test]
    fn rejects_short_secret() {
        let result = TokenCodec::new("dG9vLXNob3J0LWtleQ==", "Authorization", Duration::from_secs(60));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_invalid_header_name() {
        let result = TokenCodec::new(TEST_SECRET, "not a header", Duration::from_secs(60));
        assert!(result.is_err());
    }

    #[test]
    fn debug_output_hides_keys() {
        let debug = format!("{:?}", codec(TEST_SECRET));
        assert!(debug.contains("HS256"));
        assert!(!debug.contains(TEST_SECRET));
    }
}
