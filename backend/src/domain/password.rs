//! Password hashing with Argon2id.
//!
//! Only PHC-format hashes are ever stored; plaintext never leaves the
//! request that carried it. Argon2 is deliberately slow, so both operations
//! run on the blocking pool and the calling task only awaits the result.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::error;

use super::Error;

/// Hash `password` with a fresh random salt.
pub async fn hash_password(password: &str) -> Result<String, Error> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
}

/// Return `true` when `password` matches the stored `hash`.
///
/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
        .await
        .unwrap_or_else(|err| {
            error!(error = %err, "password verification task failed");
            false
        })
}

fn hash_blocking(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
}

fn verify_blocking(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
