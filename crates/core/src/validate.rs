//! Local credential validation shared by the login and register flows.
//!
//! Rules run in a fixed order and short-circuit on the first failure, so
//! every attempt surfaces exactly one message.

use thiserror::Error;

/// Minimum length for usernames and passwords.
pub const MIN_CREDENTIAL_LEN: usize = 6;

/// A failed validation rule. The `Display` output is the exact user-facing
/// message; nothing that fails here ever reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Username field left empty.
    #[error("Username is a required field")]
    UsernameRequired,
    /// Username shorter than [`MIN_CREDENTIAL_LEN`].
    #[error("Username must be at least 6 characters")]
    UsernameTooShort,
    /// Password field left empty.
    #[error("Password is a required field")]
    PasswordRequired,
    /// Password shorter than [`MIN_CREDENTIAL_LEN`].
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    /// Confirmation does not match the password.
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Validate login credentials: username required and at least six
/// characters, then the same for the password.
pub fn validate_login(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::UsernameRequired);
    }
    if username.chars().count() < MIN_CREDENTIAL_LEN {
        return Err(ValidationError::UsernameTooShort);
    }
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if password.chars().count() < MIN_CREDENTIAL_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Validate registration input. The confirmation field reuses the password
/// messages for its required and length checks, then must match the
/// password exactly.
pub fn validate_register(
    username: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    validate_login(username, password)?;
    if confirm_password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if confirm_password.chars().count() < MIN_CREDENTIAL_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}
