//! Authentication request types.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validations::{
    validate_email, validate_login_secret, validate_password, validate_phone, validate_user_id,
    validate_username,
};
use crate::service::NewUser;

/// Login credentials.
///
/// Parsed once per login attempt and never stored.
#[must_use]
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    /// Email address of the account.
    #[serde(rename = "email", alias = "identifier")]
    #[validate(custom(function = "validate_email"))]
    pub identifier: String,

    /// Plaintext password.
    #[serde(rename = "password", alias = "secret")]
    #[validate(custom(function = "validate_login_secret"))]
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Request payload for signup.
#[must_use]
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    /// Login handle, 4 to 8 English letters.
    #[validate(custom(function = "validate_user_id"))]
    pub user_id: String,

    #[validate(custom(function = "validate_password"))]
    pub password: String,

    /// Display name, 2 to 5 Korean characters.
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(custom(function = "validate_email"))]
    pub email: String,

    /// Phone number formatted as `01X-XXX(X)-XXXX`.
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
}

impl Signup {
    /// Converts this request into a store record.
    ///
    /// The password must be hashed separately.
    pub fn into_model(self, password_hash: String) -> NewUser {
        NewUser {
            user_id: self.user_id,
            username: self.username,
            email: self.email,
            phone: self.phone,
            password_hash,
        }
    }
}

impl fmt::Debug for Signup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signup")
            .field("user_id", &self.user_id)
            .field("password", &"[REDACTED]")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn credentials_accept_field_aliases() -> anyhow::Result<()> {
        let canonical: Credentials =
            serde_json::from_value(json!({"email": "test@test.kr", "password": "q1w2e3r4t5!@"}))?;
        let aliased: Credentials = serde_json::from_value(
            json!({"identifier": "test@test.kr", "secret": "q1w2e3r4t5!@"}),
        )?;

        assert_eq!(canonical.identifier, aliased.identifier);
        assert_eq!(canonical.secret, aliased.secret);
        Ok(())
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let credentials = Credentials {
            identifier: "test@test.kr".to_owned(),
            secret: "q1w2e3r4t5!@".to_owned(),
        };

        let debug = format!("{credentials:?}");
        assert!(debug.contains("test@test.kr"));
        assert!(!debug.contains("q1w2e3r4t5!@"));
    }

    #[test]
    fn signup_uses_camel_case_fields() -> anyhow::Result<()> {
        let signup: Signup = serde_json::from_value(json!({
            "userId": "testId",
            "password": "q1w2e3r4t5!@",
            "username": "테스트",
            "email": "test@test.kr",
            "phone": "010-1234-5678",
        }))?;

        assert!(signup.validate().is_ok());
        assert_eq!(signup.user_id, "testId");
        Ok(())
    }

    #[test]
    fn signup_reports_each_broken_field() -> anyhow::Result<()> {
        let signup: Signup = serde_json::from_value(json!({
            "userId": "id",
            "password": "password",
            "username": "테스트",
            "email": "test@test.kr",
            "phone": "010-1234-5678",
        }))?;

        let errors = signup.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("user_id"));
        assert!(fields.contains_key("password"));
        assert_eq!(fields.len(), 2);
        Ok(())
    }
}
