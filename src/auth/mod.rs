//! Credential and session-token lifecycle.
//!
//! [`AuthCore`] turns a username and password into a signed, time-bounded,
//! revocable session token and turns a presented token back into a verified
//! user. Persistence sits behind two capabilities:
//!
//! - [`UserStore`] owns user records, username uniqueness and password checks.
//! - [`TokenRevocationStore`] remembers which token ids were revoked.
//!
//! ## Tokens
//!
//! Tokens are HS256-signed claims carrying the user record, a unique `jti`, and
//! an expiry exactly 24 hours after issue. There is no server-side session
//! table: a token is valid until it expires or its `jti` is revoked. Signature
//! failures, expiry and revocation all surface as [`AuthError::InvalidToken`].
//!
//! ## Passwords
//!
//! Passwords are hashed with bcrypt at cost 8 before they reach a store.

mod claims;
mod config;
mod error;
mod memory;
mod models;
pub mod password;
mod store;

pub use claims::{SessionClaims, TokenCodec, TOKEN_LIFETIME_SECONDS};
pub use config::{AuthConfig, MIN_SIGNING_KEY_BYTES};
pub use error::{AuthError, StoreError};
pub use memory::{MemoryRevocationStore, MemoryUserStore};
pub use models::{PartialUser, User};
pub use store::{TokenRevocationStore, UserStore};

use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Business rules for sign-up, sign-in, profile updates, deletion and token checks.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct AuthCore {
    users: Arc<dyn UserStore>,
    revocations: Arc<dyn TokenRevocationStore>,
    codec: TokenCodec,
}

impl AuthCore {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        revocations: Arc<dyn TokenRevocationStore>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            users,
            revocations,
            codec: TokenCodec::new(config.signing_key()),
        }
    }

    /// Register a user and return the stored record.
    ///
    /// # Errors
    /// [`AuthError::InvalidArgument`] for an empty username or password,
    /// [`AuthError::DuplicateUser`] if the username is taken.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if username.is_empty() {
            return Err(AuthError::InvalidArgument("username must not be empty"));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidArgument("password must not be empty"));
        }

        let password_hash = password::hash(password).await?;
        self.users.create(username, &password_hash).await?;

        // Re-read to pick up identifiers generated by the store.
        let user = self.users.fetch_and_verify(username, password).await?;

        debug!(user_id = %user.id, "user created");

        Ok(user)
    }

    /// Check credentials and issue a session token.
    ///
    /// # Errors
    /// [`AuthError::UserNotFound`] for an unknown username,
    /// [`AuthError::InvalidCredentials`] for a wrong password.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let user = self.users.fetch_and_verify(username, password).await?;
        let user_id = user.id.clone();
        let token = self.codec.issue(user)?;

        debug!(user_id = %user_id, "session token issued");

        Ok(token)
    }

    /// Verify a token and return the user embedded in it.
    ///
    /// # Errors
    /// [`AuthError::InvalidToken`] if the token is malformed, badly signed,
    /// expired or revoked; [`AuthError::StoreUnavailable`] if the revocation
    /// ledger cannot be read.
    #[instrument(skip_all)]
    pub async fn parse_token(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.codec.decode(token)?;

        if self.revocations.is_revoked(&claims.jti).await? {
            debug!(jti = %claims.jti, "revoked token presented");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims.user)
    }

    /// Delete the user matching `identity`, then revoke `token`.
    ///
    /// Revocation is only attempted once the deletion succeeded.
    ///
    /// # Errors
    /// [`AuthError::UserNotFound`] if nothing matched.
    #[instrument(skip_all)]
    pub async fn delete(&self, identity: PartialUser, token: &str) -> Result<(), AuthError> {
        let identity = identity.normalized();
        self.users.delete(&identity).await?;
        self.revoke(token).await
    }

    /// Apply a profile patch for a caller finishing sign-up. The token the caller
    /// holds is not a live session yet, so nothing is revoked.
    ///
    /// # Errors
    /// [`AuthError::UserNotFound`] if the filter matches nothing,
    /// [`AuthError::DuplicateUser`] if a patched username is taken.
    #[instrument(skip_all)]
    pub async fn complete_signup_profile(
        &self,
        filter: PartialUser,
        patch: PartialUser,
    ) -> Result<User, AuthError> {
        self.apply_patch(filter, patch).await
    }

    /// Apply a profile patch and revoke the caller's token, forcing a new sign-in.
    ///
    /// # Errors
    /// [`AuthError::UserNotFound`] if the filter matches nothing,
    /// [`AuthError::DuplicateUser`] if a patched username is taken.
    #[instrument(skip_all)]
    pub async fn update_profile(
        &self,
        filter: PartialUser,
        patch: PartialUser,
        token: &str,
    ) -> Result<User, AuthError> {
        let user = self.apply_patch(filter, patch).await?;
        self.revoke(token).await?;
        Ok(user)
    }

    /// Revoke a token so it is rejected from now on.
    ///
    /// A token whose signature does not verify can never be accepted, so
    /// revoking it succeeds without touching the ledger.
    ///
    /// # Errors
    /// [`AuthError::StoreUnavailable`] if the ledger write fails.
    #[instrument(skip_all)]
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        match self.codec.decode_ignoring_expiry(token) {
            Ok(claims) => {
                self.revocations
                    .mark_revoked(&claims.jti, claims.exp)
                    .await?;
                debug!(jti = %claims.jti, "token revoked");
            }
            Err(_) => warn!("revocation requested for a token that does not verify"),
        }
        Ok(())
    }

    async fn apply_patch(
        &self,
        filter: PartialUser,
        patch: PartialUser,
    ) -> Result<User, AuthError> {
        let filter = filter.normalized();
        let mut patch = patch.normalized();

        if let Some(plain) = patch.password.take() {
            patch.password = Some(password::hash(&plain).await?);
        }

        let user = self.users.update(&filter, &patch).await?;

        debug!(user_id = %user.id, "user updated");

        Ok(user)
    }
}

impl std::fmt::Debug for AuthCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCore")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
