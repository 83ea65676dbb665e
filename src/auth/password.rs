use bcrypt::{hash, verify};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must be at least {0} characters long")]
    TooShort(usize),
    #[error("Password must be no more than {0} characters long")]
    TooLong(usize),
    #[error("Password must contain at least one uppercase letter")]
    NoUppercase,
    #[error("Password must contain at least one lowercase letter")]
    NoLowercase,
    #[error("Password must contain at least one number")]
    NoNumber,
    #[error("Password must contain at least one special character")]
    NoSpecialChar,
    #[error("Failed to hash password")]
    HashingFailed,
    #[error("Failed to verify password")]
    VerificationFailed,
}

/// Password strength requirements
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_number: bool,
    pub require_special_char: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_number: true,
            require_special_char: true,
        }
    }
}

/// Validate password strength according to policy
pub fn validate_password_strength(password: &str, policy: &PasswordPolicy) -> Result<(), PasswordError> {
    let length = password.chars().count();

    if length < policy.min_length {
        return Err(PasswordError::TooShort(policy.min_length));
    }

    if length > policy.max_length {
        return Err(PasswordError::TooLong(policy.max_length));
    }

    if policy.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
        return Err(PasswordError::NoUppercase);
    }

    if policy.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
        return Err(PasswordError::NoLowercase);
    }

    if policy.require_number && !password.chars().any(|c| c.is_numeric()) {
        return Err(PasswordError::NoNumber);
    }

    if policy.require_special_char && password.chars().all(|c| c.is_alphanumeric()) {
        return Err(PasswordError::NoSpecialChar);
    }

    Ok(())
}

/// Hash a password using bcrypt. Blocking; call off the async executor.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    hash(password, cost).map_err(|_| PasswordError::HashingFailed)
}

/// Verify a password against its hash. Blocking; call off the async executor.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    verify(password, hash).map_err(|_| PasswordError::VerificationFailed)
}
