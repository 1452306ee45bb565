//! Authentication helpers.
//!
//! Passwords are hashed with Argon2id. Roles live in [`crate::access`].

mod password;

pub use password::{
    MIN_PASSWORD_LENGTH, PasswordError, check_password_policy, hash_password, verify_password,
};
