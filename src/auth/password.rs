use bcrypt::{hash, verify, DEFAULT_COST};
use sha2::{Digest, Sha256};

use crate::error::{AppError, ValidationReason};

pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_PASSWORD_CHARS: usize = 128;

/// Checks the password length policy, counted in code points.
pub fn check_password_policy(password: &str) -> Result<(), ValidationReason> {
    if password.is_empty() {
        return Err(ValidationReason::PasswordRequired);
    }
    let chars = password.chars().count();
    if chars < MIN_PASSWORD_CHARS {
        return Err(ValidationReason::PasswordTooShort);
    }
    if chars > MAX_PASSWORD_CHARS {
        return Err(ValidationReason::PasswordTooLong);
    }
    Ok(())
}

// bcrypt only reads the first 72 bytes of its input. A 128 code point password
// can be up to 512 bytes, so every password is reduced to its SHA-256 hex digest
// (64 bytes) first.
fn prehash(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(prehash(password), DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(prehash(password), hashed_password)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}

/// Runs [`hash_password`] on the blocking thread pool.
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

/// Runs [`verify_password`] on the blocking thread pool.
pub async fn verify_password_blocking(
    password: String,
    hashed_password: String,
) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hashed_password))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
}
