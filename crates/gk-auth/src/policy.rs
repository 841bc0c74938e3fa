//! Password complexity policy.

use crate::error::{AuthError, AuthResult};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Accepted symbol characters.
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?`~";

/// Validates a candidate password against the complexity rules: at least
/// [`MIN_PASSWORD_LENGTH`] characters with one uppercase letter, one
/// lowercase letter, one digit, and one symbol from [`SYMBOLS`].
///
/// ## Errors
///
/// Returns `AuthError::PasswordPolicyViolation` naming the first rule that
/// fails.
pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::PasswordPolicyViolation(format!(
            "must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AuthError::PasswordPolicyViolation(
            "must contain an uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AuthError::PasswordPolicyViolation(
            "must contain a lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::PasswordPolicyViolation(
            "must contain a digit".to_string(),
        ));
    }
    if !password.chars().any(|c| SYMBOLS.contains(c)) {
        return Err(AuthError::PasswordPolicyViolation(
            "must contain a symbol".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_compliant_password() {
        assert!(validate_password("Str0ng!pass").is_ok());
        assert!(validate_password("aB3{defg").is_ok());
    }

    #[test]
    fn rejects_each_missing_class() {
        assert!(validate_password("Ab1!x").is_err()); // too short
        assert!(validate_password("lower1!aaa").is_err()); // no uppercase
        assert!(validate_password("UPPER1!AAA").is_err()); // no lowercase
        assert!(validate_password("NoDigits!!").is_err()); // no digit
        assert!(validate_password("NoSymbol11").is_err()); // no symbol
    }

    #[test]
    fn violation_names_the_rule() {
        let err = validate_password("short").unwrap_err();
        assert!(err.to_string().contains("at least 8"));
    }
}
