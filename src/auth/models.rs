//! User records and the partial form used for filters and patches.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A stored user. `password_hash` is a bcrypt hash, never the raw password.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<i64>,
    pub username: String,
    pub password_hash: String,
}

/// A user record with every field optional.
///
/// As a filter, set fields must all match. As a patch, set fields overwrite the
/// stored ones; `password` carries plaintext and is hashed before it reaches a
/// store. Empty strings and a zero `legacy_id` count as unset, see [`Self::normalized`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PartialUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub legacy_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl PartialUser {
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Drop empty strings and a zero `legacy_id`.
    #[must_use]
    pub fn normalized(self) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        Self {
            id: non_empty(self.id),
            legacy_id: self.legacy_id.filter(|v| *v != 0),
            username: non_empty(self.username),
            password: non_empty(self.password),
        }
    }

    /// True when no field is set. An empty filter matches nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.legacy_id.is_none()
            && self.username.is_none()
            && self.password.is_none()
    }

    /// Check a stored user against this filter.
    ///
    /// `password` is compared to the stored hash verbatim, the same way a
    /// document store would match the field.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        if self.is_empty() {
            return false;
        }
        self.id.as_ref().map_or(true, |id| *id == user.id)
            && self
                .legacy_id
                .map_or(true, |legacy| Some(legacy) == user.legacy_id)
            && self
                .username
                .as_ref()
                .map_or(true, |username| *username == user.username)
            && self
                .password
                .as_ref()
                .map_or(true, |hash| *hash == user.password_hash)
    }
}

impl From<&User> for PartialUser {
    fn from(user: &User) -> Self {
        Self {
            id: Some(user.id.clone()),
            legacy_id: user.legacy_id,
            username: Some(user.username.clone()),
            password: Some(user.password_hash.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: "0b0f7c1e-2a7d-4f6b-9d6a-1a1f2b3c4d5e".to_string(),
            legacy_id: Some(42),
            username: "alice".to_string(),
            password_hash: "$2b$08$hash".to_string(),
        }
    }

    #[test]
    fn normalized_drops_empty_values() {
        let partial = PartialUser {
            id: Some(String::new()),
            legacy_id: Some(0),
            username: Some("alice".to_string()),
            password: Some(String::new()),
        }
        .normalized();

        assert_eq!(partial, PartialUser::with_username("alice"));
    }

    #[test]
    fn empty_filter_matches_nothing() {
        assert!(PartialUser::default().is_empty());
        assert!(!PartialUser::default().matches(&alice()));
    }

    #[test]
    fn filter_requires_every_set_field() {
        let user = alice();
        assert!(PartialUser::with_username("alice").matches(&user));
        assert!(PartialUser::with_id(user.id.clone()).matches(&user));
        assert!(PartialUser::from(&user).matches(&user));

        let mut wrong_legacy = PartialUser::with_username("alice");
        wrong_legacy.legacy_id = Some(7);
        assert!(!wrong_legacy.matches(&user));

        assert!(!PartialUser::with_username("Alice").matches(&user));
    }

    #[test]
    fn partial_user_deserializes_missing_fields() -> anyhow::Result<()> {
        let partial: PartialUser = serde_json::from_str(r#"{"username":"bob"}"#)?;
        assert_eq!(partial, PartialUser::with_username("bob"));
        Ok(())
    }
}
