//! Route handlers and the mapping from [`AuthError`] to HTTP responses.

pub mod auth;
pub mod health;
pub mod types;
pub mod users;

use crate::auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

/// Status code reported for each error kind.
#[must_use]
pub const fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidArgument(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AuthError::DuplicateUser => StatusCode::CONFLICT,
        AuthError::UserNotFound => StatusCode::NOT_FOUND,
        AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
        AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
        AuthError::StoreUnavailable(_) | AuthError::Hash(_) | AuthError::Signing(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AuthError {
    /// Client errors carry their message; internal failures are logged and
    /// answered with a bare `500`.
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if self.is_client_error() {
            debug!("Request rejected: {self}");
            (status, self.to_string()).into_response()
        } else {
            error!("Request failed: {self:?}");
            (status, "Internal server error").into_response()
        }
    }
}

pub(crate) fn missing_payload() -> Response {
    (StatusCode::BAD_REQUEST, "Missing payload").into_response()
}
