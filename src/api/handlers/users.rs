//! Account deletion and profile updates.

use super::{
    missing_payload,
    types::{
        DeleteUserRequest, SignupProfileRequest, StatusResponse, UpdateProfileRequest,
        UserResponse,
    },
};
use crate::auth::AuthCore;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    delete,
    path = "/v1/users",
    request_body = DeleteUserRequest,
    responses(
        (status = 200, description = "User deleted and token revoked", body = StatusResponse),
        (status = 400, description = "Missing payload"),
        (status = 404, description = "No user matched"),
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn delete_user(
    core: Extension<Arc<AuthCore>>,
    payload: Option<Json<DeleteUserRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return missing_payload();
    };

    match core.delete(request.user, &request.token).await {
        Ok(()) => (StatusCode::OK, Json(StatusResponse::ok())).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/v1/users/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated, the presented token is revoked", body = UserResponse),
        (status = 400, description = "Missing payload"),
        (status = 404, description = "No user matched"),
        (status = 409, description = "Username already in use"),
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn update_profile(
    core: Extension<Arc<AuthCore>>,
    payload: Option<Json<UpdateProfileRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return missing_payload();
    };

    match core
        .update_profile(request.filter, request.patch, &request.token)
        .await
    {
        Ok(user) => (StatusCode::OK, Json(UserResponse::from(user))).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/v1/users/signup-profile",
    request_body = SignupProfileRequest,
    responses(
        (status = 200, description = "Profile completed", body = UserResponse),
        (status = 400, description = "Missing payload"),
        (status = 404, description = "No user matched"),
        (status = 409, description = "Username already in use"),
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn complete_signup_profile(
    core: Extension<Arc<AuthCore>>,
    payload: Option<Json<SignupProfileRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return missing_payload();
    };

    match core
        .complete_signup_profile(request.filter, request.patch)
        .await
    {
        Ok(user) => (StatusCode::OK, Json(UserResponse::from(user))).into_response(),
        Err(err) => err.into_response(),
    }
}
