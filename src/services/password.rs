use thiserror::Error;

/// bcrypt work factor for new hashes
pub const HASH_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hash `password` with bcrypt. bcrypt is CPU-bound, so it runs on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = password.to_string();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST)).await??;
    Ok(hashed)
}

/// Check `password` against a stored bcrypt hash (`$2a$`, `$2b$` or `$2y$`).
///
/// A malformed stored hash never verifies.
pub async fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let stored = stored.to_string();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &stored).unwrap_or(false)).await?;
    Ok(verified)
}
