use bcrypt::BcryptError;

use crate::error::{AppError, Result};

/// bcrypt reads 72 bytes of input, the trailing NUL included.
pub const MAX_PASSWORD_BYTES: usize = 71;

const TIMING_SALT: [u8; 16] = [0x5a; 16];

pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::non_truncating_hash(password, cost).map_err(|e| match e {
        BcryptError::Truncation(_) => AppError::BadRequest(format!(
            "Password must be at most {} bytes, got {}",
            MAX_PASSWORD_BYTES,
            password.len()
        )),
        other => AppError::InternalError(format!("Password hashing failed: {}", other)),
    })
}

/// Passwords longer than bcrypt's input limit never match.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Ok(false);
    }

    bcrypt::non_truncating_verify(password, password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))
}

/// Spends one hash at `cost` so a login for an unknown account takes as long
/// as a failed verification.
pub fn equalize_timing(password: &str, cost: u32) {
    let _ = bcrypt::hash_with_salt(password, cost, TIMING_SALT);
}
