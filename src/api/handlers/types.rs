//! Request and response bodies. Anything carrying a password or a token
//! prints it as `***`.

use crate::auth::{PartialUser, User};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize)]
pub struct TokenBody {
    pub token: String,
}

impl std::fmt::Debug for TokenBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBody").field("token", &"***").finish()
    }
}

/// Public view of a user. The password hash never leaves the service.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<i64>,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            legacy_id: user.legacy_id,
            username: user.username,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize)]
pub struct DeleteUserRequest {
    pub user: PartialUser,
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub filter: PartialUser,
    #[serde(default)]
    pub patch: PartialUser,
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize)]
pub struct SignupProfileRequest {
    #[serde(default)]
    pub filter: PartialUser,
    #[serde(default)]
    pub patch: PartialUser,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct StatusResponse {
    pub response: String,
}

impl StatusResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            response: "Ok".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_response_drops_hash() -> anyhow::Result<()> {
        let user = User {
            id: "6f1c3f0e-8d5b-4f6e-9a3c-0d2b1e4f5a6b".to_string(),
            legacy_id: None,
            username: "alice".to_string(),
            password_hash: "$2b$08$secret".to_string(),
        };
        let json = serde_json::to_string(&UserResponse::from(user))?;
        assert!(!json.contains("secret"));
        assert!(!json.contains("legacy_id"));
        assert!(json.contains("\"username\":\"alice\""));
        Ok(())
    }

    #[test]
    fn debug_redacts_secrets() {
        let credentials = Credentials {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
        };
        let token = TokenBody {
            token: "eyJhbGciOi".to_string(),
        };
        assert!(!format!("{credentials:?}").contains("hunter2"));
        assert!(!format!("{token:?}").contains("eyJ"));
    }

    #[test]
    fn profile_request_defaults_missing_parts() -> anyhow::Result<()> {
        let request: UpdateProfileRequest = serde_json::from_str(r#"{"token":"t"}"#)?;
        assert!(request.filter.is_empty());
        assert!(request.patch.is_empty());
        Ok(())
    }
}
