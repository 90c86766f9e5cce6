//! Session claims and the HS256 token codec.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use ulid::Ulid;

use super::{error::AuthError, models::User};

/// Every token expires this many seconds after it was issued.
pub const TOKEN_LIFETIME_SECONDS: i64 = 24 * 60 * 60;

/// Payload signed into every session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user: User,
    /// Unique per issued token; revocation is keyed on it.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    #[must_use]
    pub fn new(user: User, issued_at: i64) -> Self {
        Self {
            user,
            jti: Ulid::new().to_string(),
            iat: issued_at,
            exp: issued_at + TOKEN_LIFETIME_SECONDS,
        }
    }
}

/// Signs and verifies session tokens with a pre-shared symmetric key.
///
/// Built once from the configured secret and shared read-only by every request.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    strict: Validation,
    signature_only: Validation,
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut strict = Validation::new(Algorithm::HS256);
        strict.leeway = 0;
        strict.validate_aud = false;
        strict.set_required_spec_claims(&["exp"]);

        let mut signature_only = strict.clone();
        signature_only.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            strict,
            signature_only,
        }
    }

    /// Issue a token for `user` starting now.
    ///
    /// # Errors
    /// Returns [`AuthError::Signing`] if the claims cannot be signed.
    pub fn issue(&self, user: User) -> Result<String, AuthError> {
        self.issue_at(user, now_unix_seconds())
    }

    /// Issue a token as if it had been created at `issued_at` (unix seconds).
    ///
    /// # Errors
    /// Returns [`AuthError::Signing`] if the claims cannot be signed.
    pub fn issue_at(&self, user: User, issued_at: i64) -> Result<String, AuthError> {
        let claims = SessionClaims::new(user, issued_at);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    /// Verify signature and expiry and return the claims.
    ///
    /// # Errors
    /// Any failure is reported as [`AuthError::InvalidToken`].
    pub fn decode(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let claims = decode::<SessionClaims>(token, &self.decoding, &self.strict)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)?;

        // jsonwebtoken only rejects `exp < now`; a token is already dead at `exp`.
        if claims.exp <= now_unix_seconds() {
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }

    /// Verify only the signature. Used to revoke tokens that may already be expired.
    ///
    /// # Errors
    /// Any failure is reported as [`AuthError::InvalidToken`].
    pub fn decode_ignoring_expiry(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding, &self.signature_only)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &"HS256")
            .field("key", &"***")
            .finish()
    }
}

pub(crate) fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}
