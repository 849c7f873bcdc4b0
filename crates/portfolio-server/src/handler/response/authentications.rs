//! Authentication response types.

use serde::{Deserialize, Serialize};

/// Response returned after a successful login.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    /// Signed access token to send as `Bearer <token>`.
    pub access_token: String,
}

/// Response returned after a successful signup.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: String,
    pub detail: String,
}
