//! bcrypt helpers shared by the core and the store backends.
//!
//! bcrypt is CPU bound, so both helpers run it on the blocking pool instead of
//! an async worker thread.

use thiserror::Error;
use tracing::error;

/// Fixed bcrypt work factor for stored password hashes.
pub const PASSWORD_HASH_COST: u32 = 8;

#[derive(Debug, Error)]
pub enum HashError {
    #[error(transparent)]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task did not complete")]
    Task(#[from] tokio::task::JoinError),
}

/// Salt and hash a plaintext password.
///
/// # Errors
/// Returns an error if bcrypt rejects the input or the blocking task fails.
pub async fn hash(password: &str) -> Result<String, HashError> {
    let password = password.to_string();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, PASSWORD_HASH_COST))
        .await??;
    Ok(hashed)
}

/// Compare a plaintext password against a stored hash.
/// A malformed hash never verifies.
pub async fn verify(password: &str, password_hash: &str) -> bool {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    match tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash)).await {
        Ok(result) => result.unwrap_or(false),
        Err(err) => {
            error!("password verification task failed: {}", err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_uses_fixed_cost() -> anyhow::Result<()> {
        let hashed = hash("s3cret").await?;
        let parts: bcrypt::HashParts = hashed.parse()?;
        assert_eq!(parts.get_cost(), PASSWORD_HASH_COST);
        Ok(())
    }

    #[tokio::test]
    async fn hash_is_salted() -> anyhow::Result<()> {
        let first = hash("s3cret").await?;
        let second = hash("s3cret").await?;
        assert_ne!(first, second);
        assert!(verify("s3cret", &first).await);
        assert!(verify("s3cret", &second).await);
        Ok(())
    }

    #[tokio::test]
    async fn verify_rejects_wrong_password_and_garbage() -> anyhow::Result<()> {
        let hashed = hash("s3cret").await?;
        assert!(!verify("S3cret", &hashed).await);
        assert!(!verify("s3cret", "not-a-bcrypt-hash").await);
        assert!(!verify("s3cret", "").await);
        Ok(())
    }
}
