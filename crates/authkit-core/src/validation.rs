//! Credential syntax checks run before any provider call.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Shortest password accepted by [`validate`].
pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Outcome of [`validate`].
///
/// Exactly one variant applies; checks run in declaration order and the
/// first failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationResult {
    NoEmail,
    InvalidEmail,
    NoPassword,
    PasswordTooShort,
    PasswordsNotEqual,
    Valid,
}

impl ValidationResult {
    pub fn is_valid(self) -> bool {
        self == ValidationResult::Valid
    }

    /// Stable machine-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationResult::NoEmail => "no-email",
            ValidationResult::InvalidEmail => "invalid-email",
            ValidationResult::NoPassword => "no-password",
            ValidationResult::PasswordTooShort => "password-too-short",
            ValidationResult::PasswordsNotEqual => "passwords-not-equal",
            ValidationResult::Valid => "valid",
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ValidationResult::NoEmail => "an email address is required",
            ValidationResult::InvalidEmail => "the email address is not valid",
            ValidationResult::NoPassword => "a password is required",
            ValidationResult::PasswordTooShort => "the password is too short",
            ValidationResult::PasswordsNotEqual => "the passwords do not match",
            ValidationResult::Valid => "valid",
        };
        f.write_str(text)
    }
}

/// Returns true if `email` looks like `local@domain.tld`.
///
/// This is a syntactic check only; deliverability is the provider's concern.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

/// Classify an email and password pair.
///
/// `password_b` is the confirmation field of registration and reset forms.
/// Pass an empty string for plain login; the equality check is skipped.
///
/// # Example
///
/// ```
/// use authkit_core::{ValidationResult, validate};
///
/// assert_eq!(validate("", "", ""), ValidationResult::NoEmail);
/// assert_eq!(validate("a@b.com", "longenough1", ""), ValidationResult::Valid);
/// ```
pub fn validate(email: &str, password_a: &str, password_b: &str) -> ValidationResult {
    let email = email.trim();
    if email.is_empty() {
        return ValidationResult::NoEmail;
    }
    if !is_valid_email(email) {
        return ValidationResult::InvalidEmail;
    }
    if password_a.is_empty() {
        return ValidationResult::NoPassword;
    }
    if password_a.chars().count() < MIN_PASSWORD_LENGTH {
        return ValidationResult::PasswordTooShort;
    }
    if !password_b.is_empty() && password_a != password_b {
        return ValidationResult::PasswordsNotEqual;
    }
    ValidationResult::Valid
}
