//! Error taxonomy for the credential and token lifecycle.

use thiserror::Error;

/// Failures reported by a [`super::UserStore`] or [`super::TokenRevocationStore`].
///
/// The first three variants are part of the store contract and get classified by
/// [`super::AuthCore`]. Anything else is wrapped in `Backend` and passes through
/// unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already in use")]
    DuplicateUsername,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("store backend failure")]
    Backend(#[source] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Backend(err.into())
    }
}

/// Errors returned by [`super::AuthCore`] operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("username already in use")]
    DuplicateUser,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Covers malformed tokens, bad signatures, expiry and revocation alike.
    #[error("invalid access token")]
    InvalidToken,
    #[error("store unavailable")]
    StoreUnavailable(#[source] anyhow::Error),
    #[error("password hashing failed")]
    Hash(#[from] super::password::HashError),
    #[error("token signing failed")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// True for the kinds the caller can act on; false for internal failures.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_)
                | Self::DuplicateUser
                | Self::UserNotFound
                | Self::InvalidCredentials
                | Self::InvalidToken
        )
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername => Self::DuplicateUser,
            StoreError::UserNotFound => Self::UserNotFound,
            StoreError::InvalidCredentials => Self::InvalidCredentials,
            StoreError::Backend(source) => Self::StoreUnavailable(source),
        }
    }
}
