//! Request validation utilities.
//!
//! Field rules that `validator` has no built-in for are expressed as
//! `custom` functions over precompiled patterns.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

static USER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]{4,8}$").expect("valid user id pattern"));

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[가-힣]{2,5}$").expect("valid username pattern"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^01[0-9]-[0-9]{3,4}-[0-9]{4}$").expect("valid phone pattern")
});

/// Characters counted as special in a password.
const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Minimum letters, digits and specials of a signup password.
const SIGNUP_PASSWORD_MINIMUMS: PasswordComposition = PasswordComposition {
    letters: 5,
    digits: 5,
    specials: 2,
};

/// Minimum letters, digits and specials of a submitted login secret.
const LOGIN_SECRET_MINIMUMS: PasswordComposition = PasswordComposition {
    letters: 1,
    digits: 1,
    specials: 1,
};

/// Character class counts of a password. Other characters are not counted
/// and do not make a password invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PasswordComposition {
    letters: usize,
    digits: usize,
    specials: usize,
}

impl PasswordComposition {
    fn of(password: &str) -> Self {
        password.chars().fold(
            Self {
                letters: 0,
                digits: 0,
                specials: 0,
            },
            |mut counts, c| {
                if c.is_ascii_alphabetic() {
                    counts.letters += 1;
                } else if c.is_ascii_digit() {
                    counts.digits += 1;
                } else if PASSWORD_SPECIALS.contains(c) {
                    counts.specials += 1;
                }
                counts
            },
        )
    }

    fn satisfies(self, minimums: Self) -> bool {
        self.letters >= minimums.letters
            && self.digits >= minimums.digits
            && self.specials >= minimums.specials
    }
}

pub fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

pub fn validate_user_id(user_id: &str) -> Result<(), ValidationError> {
    if !USER_ID.is_match(user_id) {
        return Err(validation_error(
            "user_id_format",
            "User id must be 4 to 8 English letters.",
        ));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !USERNAME.is_match(username) {
        return Err(validation_error(
            "username_format",
            "Username must be 2 to 5 Korean characters.",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if !EMAIL.is_match(email) {
        return Err(validation_error(
            "email_format",
            "Email must be a valid email address.",
        ));
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if !PHONE.is_match(phone) {
        return Err(validation_error(
            "phone_format",
            "Phone must look like 010-1234-5678.",
        ));
    }
    Ok(())
}

/// Signup password policy: enough letters, digits and special characters.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if !PasswordComposition::of(password).satisfies(SIGNUP_PASSWORD_MINIMUMS) {
        return Err(validation_error(
            "password_policy",
            "Password must contain at least 5 letters, 5 digits and 2 special characters.",
        ));
    }
    Ok(())
}

/// Login secret rule: a letter, a digit and a special character.
///
/// Looser than the signup policy so that any registered password passes.
pub fn validate_login_secret(secret: &str) -> Result<(), ValidationError> {
    if !PasswordComposition::of(secret).satisfies(LOGIN_SECRET_MINIMUMS) {
        return Err(validation_error(
            "password_format",
            "Password must contain letters, digits and special characters.",
        ));
    }
    Ok(())
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(validation_error("blank", "Value must not be blank."));
    }
    Ok(())
}
