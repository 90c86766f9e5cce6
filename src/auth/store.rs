//! Storage capabilities consumed by [`super::AuthCore`].

use async_trait::async_trait;

use super::{
    error::StoreError,
    models::{PartialUser, User},
};

/// Durable user records keyed by username.
///
/// Implementations own username uniqueness and credential comparison.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with [`StoreError::DuplicateUsername`] if the
    /// username is taken, leaving the existing record untouched.
    async fn create(&self, username: &str, password_hash: &str) -> Result<(), StoreError>;

    /// Load a user by username and check `password` against the stored hash.
    async fn fetch_and_verify(&self, username: &str, password: &str) -> Result<User, StoreError>;

    /// Overwrite the set fields of `patch` on the first record matching `filter`
    /// and return the updated record. `patch.password` must already be hashed.
    async fn update(&self, filter: &PartialUser, patch: &PartialUser) -> Result<User, StoreError>;

    /// Remove the first record matching `identity`.
    async fn delete(&self, identity: &PartialUser) -> Result<(), StoreError>;
}

/// Append-only ledger of revoked token ids.
#[async_trait]
pub trait TokenRevocationStore: Send + Sync {
    /// Record `token_id` as revoked. Idempotent. `expires_at` is the token's
    /// natural expiry in unix seconds.
    async fn mark_revoked(&self, token_id: &str, expires_at: i64) -> Result<(), StoreError>;

    async fn is_revoked(&self, token_id: &str) -> Result<bool, StoreError>;
}
