//! Explicit configuration for [`super::AuthCore`].

use secrecy::{ExposeSecret, SecretString};

/// Shortest signing secret accepted for HS256.
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

#[derive(Clone)]
pub struct AuthConfig {
    signing_key: SecretString,
}

impl AuthConfig {
    #[must_use]
    pub fn new(signing_key: SecretString) -> Self {
        Self { signing_key }
    }

    /// Check that the signing key is long enough to be used.
    ///
    /// # Errors
    /// Returns a message naming the problem.
    pub fn validate(&self) -> Result<(), String> {
        let len = self.signing_key.expose_secret().len();
        if len < MIN_SIGNING_KEY_BYTES {
            return Err(format!(
                "signing key must be at least {MIN_SIGNING_KEY_BYTES} bytes, got {len}"
            ));
        }
        Ok(())
    }

    pub(super) fn signing_key(&self) -> &[u8] {
        self.signing_key.expose_secret().as_bytes()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_key", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_key_is_rejected() {
        let config = AuthConfig::new(SecretString::from("too-short"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn long_key_is_accepted() {
        let config = AuthConfig::new(SecretString::from("k".repeat(MIN_SIGNING_KEY_BYTES)));
        assert!(config.validate().is_ok());
        assert_eq!(config.signing_key().len(), MIN_SIGNING_KEY_BYTES);
    }

    #[test]
    fn debug_redacts_key() {
        let config = AuthConfig::new(SecretString::from("super-secret-signing-key-material!"));
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
    }
}
