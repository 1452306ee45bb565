//! Password hashing with Argon2id, default parameters.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use thiserror::Error;

/// Errors that can occur during password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Failed to hash password.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password.
    #[error("failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format.
    #[error("invalid password hash format")]
    InvalidHash,

    /// New password is shorter than the policy allows.
    #[error("password must be at least {0} characters")]
    TooShort(usize),
}

/// Minimum length of a new password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Checks a new password against the length policy.
///
/// Leading and trailing whitespace does not count.
///
/// # Errors
///
/// Returns `PasswordError::TooShort` for short passwords.
pub fn check_password_policy(password: &str) -> Result<(), PasswordError> {
    if password.trim().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort(MIN_PASSWORD_LENGTH));
    }
    Ok(())
}

/// Hashes a password using Argon2id into a PHC string.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails.
///
/// # Example
///
/// ```
/// use holdco_core::auth::hash_password;
///
/// let hash = hash_password("Holdco@2026").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored PHC hash.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if the hash format is invalid.
/// Returns `PasswordError::VerifyError` if verification fails unexpectedly.
///
/// # Example
///
/// ```
/// use holdco_core::auth::{hash_password, verify_password};
///
/// let hash = hash_password("Holdco@2026").unwrap();
/// assert!(verify_password("Holdco@2026", &hash).unwrap());
/// assert!(!verify_password("holdco@2026", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("staff-password").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("staff-password", &hash).unwrap());
        assert!(!verify_password("Staff-password", &hash).unwrap());
    }

    #[test]
    fn test_salt_differs_per_hash() {
        assert_ne!(
            hash_password("same").unwrap(),
            hash_password("same").unwrap()
        );
    }

    #[test]
    fn test_password_policy() {
        assert!(check_password_policy("Holdco@2026").is_ok());
        assert!(matches!(
            check_password_policy("short"),
            Err(PasswordError::TooShort(MIN_PASSWORD_LENGTH))
        ));
        assert!(check_password_policy("   seven  ").is_err());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "invalid_hash");
        assert!(matches!(result, Err(PasswordError::InvalidHash)));
    }
}
