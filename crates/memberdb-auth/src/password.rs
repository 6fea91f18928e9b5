// Password hashing and verification

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use memberdb_commons::{AppError, AppResult};

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Upper bound to keep hashing cost predictable.
pub const MAX_PASSWORD_LENGTH: usize = 512;

/// Hash a password with Argon2id (default parameters, random salt).
///
/// The PHC output string is self-describing: it embeds the algorithm,
/// parameters and salt needed to verify later. Hashing is CPU-bound and runs
/// on the blocking pool so the request loop never stalls behind it.
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AppError::Hashing(format!("join error: {e}")))?
}

/// Verify a candidate password against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; mapping that to an authentication error is
/// the gate's job. A stored hash that cannot even be parsed is a fatal
/// `Hashing` error: that row is corrupt, not merely wrong.
pub async fn verify_password(stored_hash: &str, candidate: &str) -> AppResult<bool> {
    let stored_hash = stored_hash.to_string();
    let candidate = candidate.to_string();

    tokio::task::spawn_blocking(move || {
        let parsed =
            PasswordHash::new(&stored_hash).map_err(|e| AppError::Hashing(e.to_string()))?;
        match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::Hashing(e.to_string())),
        }
    })
    .await
    .map_err(|e| AppError::Hashing(format!("join error: {e}")))?
}

/// Length validation applied before hashing a new membership's password.
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
