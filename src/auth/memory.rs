//! In-memory store backends for tests and local development.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    error::StoreError,
    models::{PartialUser, User},
    password,
    store::{TokenRevocationStore, UserStore},
};

/// Users keyed by id. Username uniqueness is checked under the write lock.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Snapshot of the record stored under `username`.
    pub async fn get(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|user| user.username == username)
            .cloned()
    }
}

fn first_match<'a>(users: &'a HashMap<String, User>, filter: &PartialUser) -> Option<&'a User> {
    // Lowest id wins so "first match" is stable across calls.
    users
        .values()
        .filter(|user| filter.matches(user))
        .min_by(|a, b| a.id.cmp(&b.id))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|user| user.username == username) {
            return Err(StoreError::DuplicateUsername);
        }

        let id = Uuid::new_v4().to_string();
        users.insert(
            id.clone(),
            User {
                id,
                legacy_id: None,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            },
        );

        Ok(())
    }

    async fn fetch_and_verify(&self, username: &str, password: &str) -> Result<User, StoreError> {
        let user = self.get(username).await.ok_or(StoreError::UserNotFound)?;

        if password::verify(password, &user.password_hash).await {
            Ok(user)
        } else {
            Err(StoreError::InvalidCredentials)
        }
    }

    async fn update(&self, filter: &PartialUser, patch: &PartialUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let id = first_match(&users, filter)
            .map(|user| user.id.clone())
            .ok_or(StoreError::UserNotFound)?;

        if let Some(username) = &patch.username {
            if users
                .values()
                .any(|user| user.id != id && user.username == *username)
            {
                return Err(StoreError::DuplicateUsername);
            }
        }

        let user = users.get_mut(&id).ok_or(StoreError::UserNotFound)?;
        if let Some(legacy_id) = patch.legacy_id {
            user.legacy_id = Some(legacy_id);
        }
        if let Some(username) = &patch.username {
            user.username.clone_from(username);
        }
        if let Some(password_hash) = &patch.password {
            user.password_hash.clone_from(password_hash);
        }

        Ok(user.clone())
    }

    async fn delete(&self, identity: &PartialUser) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let id = first_match(&users, identity)
            .map(|user| user.id.clone())
            .ok_or(StoreError::UserNotFound)?;
        users.remove(&id);
        Ok(())
    }
}

/// Revoked token ids. Entries are never removed.
#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    revoked: RwLock<HashSet<String>>,
}

impl MemoryRevocationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.revoked.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.revoked.read().await.is_empty()
    }
}

#[async_trait]
impl TokenRevocationStore for MemoryRevocationStore {
    async fn mark_revoked(&self, token_id: &str, _expires_at: i64) -> Result<(), StoreError> {
        self.revoked.write().await.insert(token_id.to_string());
        Ok(())
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool, StoreError> {
        Ok(self.revoked.read().await.contains(token_id))
    }
}
