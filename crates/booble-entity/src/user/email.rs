//! Email address value object.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use booble_core::AppError;

/// Longest address accepted (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 320;

/// A validated, lowercase email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Parse and normalize an email address.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("Email cannot be empty"));
        }
        if trimmed.len() > MAX_EMAIL_LENGTH {
            return Err(AppError::validation(format!(
                "Email cannot exceed {MAX_EMAIL_LENGTH} characters"
            )));
        }
        if !trimmed.validate_email() || !has_public_suffix(trimmed) {
            return Err(AppError::validation("Invalid email format"));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// The normalized address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Domain must end in an alphabetic label of two or more characters.
fn has_public_suffix(address: &str) -> bool {
    address
        .rsplit_once('@')
        .and_then(|(_, domain)| domain.rsplit_once('.'))
        .is_some_and(|(_, tld)| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}
