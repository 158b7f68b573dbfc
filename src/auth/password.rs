use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

use crate::errors::{AppError, AppResult};

/// Verified against when a username is unknown, so both failure paths pay
/// for one argon2 run.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("dummy password for unknown users").ok());

/// Hashes a password into a PHC string (argon2id, random salt).
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

/// `hash_password` on the blocking pool.
pub async fn hash_password_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalError(format!("Password hashing task failed: {}", e)))?
}

/// `verify_password` on the blocking pool. `None` checks against a dummy
/// hash and always fails.
pub async fn verify_password_blocking(
    password: String,
    password_hash: Option<String>,
) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || match password_hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                verify_password(&password, dummy);
            }
            false
        }
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Password verification task failed: {}", e)))
}
