//! Password policy enforcement for new passwords.

use booble_core::config::AuthConfig;
use booble_core::error::AppError;

/// Longest password accepted; bounds hashing cost.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validates new passwords against length and strength policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    min_score: u8,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_score: config.password_min_score.min(4),
        }
    }

    /// Validates a password, returning the first violation found.
    ///
    /// `user_inputs` (email, names) are penalized by the strength estimator.
    pub fn validate(&self, password: &str, user_inputs: &[&str]) -> Result<(), AppError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        if length > MAX_PASSWORD_LENGTH {
            return Err(AppError::validation(format!(
                "Password cannot exceed {MAX_PASSWORD_LENGTH} characters"
            )));
        }

        let estimate = zxcvbn::zxcvbn(password, user_inputs);
        if (estimate.score() as u8) < self.min_score {
            return Err(AppError::validation(
                "Password is too weak. Please use a stronger password.",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(min_score: u8) -> PasswordValidator {
        PasswordValidator::new(&AuthConfig {
            password_min_score: min_score,
            ..AuthConfig::default()
        })
    }

    #[test]
    fn test_too_short() {
        let err = validator(0).validate("short", &[]).unwrap_err();
        assert!(err.message.contains("at least 8"));
    }

    #[test]
    fn test_too_long() {
        assert!(validator(0).validate(&"a".repeat(200), &[]).is_err());
    }

    #[test]
    fn test_weak_rejected_with_score() {
        assert!(validator(3).validate("password", &[]).is_err());
        assert!(validator(0).validate("password", &[]).is_ok());
    }

    #[test]
    fn test_strong_accepted() {
        assert!(validator(3).validate("T4ngerine!Orbit#Lantern", &[]).is_ok());
    }
}
