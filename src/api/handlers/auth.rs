//! Sign-up, sign-in, token verification and sign-out.

use super::{
    missing_payload,
    types::{Credentials, TokenBody, UserResponse},
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
    post,
    path = "/v1/auth/signup",
    request_body = Credentials,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing payload"),
        (status = 409, description = "Username already in use"),
        (status = 422, description = "Empty username or password"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn sign_up(
    core: Extension<Arc<AuthCore>>,
    payload: Option<Json<Credentials>>,
) -> Response {
    let Some(Json(credentials)) = payload else {
        return missing_payload();
    };

    match core
        .sign_up(&credentials.username, &credentials.password)
        .await
    {
        Ok(user) => (StatusCode::CREATED, Json(UserResponse::from(user))).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/signin",
    request_body = Credentials,
    responses(
        (status = 200, description = "Session token issued", body = TokenBody),
        (status = 400, description = "Missing payload or wrong password"),
        (status = 404, description = "Unknown username"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn sign_in(
    core: Extension<Arc<AuthCore>>,
    payload: Option<Json<Credentials>>,
) -> Response {
    let Some(Json(credentials)) = payload else {
        return missing_payload();
    };

    match core
        .sign_in(&credentials.username, &credentials.password)
        .await
    {
        Ok(token) => (StatusCode::OK, Json(TokenBody { token })).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/verify",
    request_body = TokenBody,
    responses(
        (status = 200, description = "Token is valid", body = UserResponse),
        (status = 400, description = "Missing payload"),
        (status = 401, description = "Token is malformed, expired or revoked"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn verify(core: Extension<Arc<AuthCore>>, payload: Option<Json<TokenBody>>) -> Response {
    let Some(Json(body)) = payload else {
        return missing_payload();
    };

    match core.parse_token(&body.token).await {
        Ok(user) => (StatusCode::OK, Json(UserResponse::from(user))).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/signout",
    request_body = TokenBody,
    responses(
        (status = 204, description = "Token revoked"),
        (status = 400, description = "Missing payload"),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn sign_out(
    core: Extension<Arc<AuthCore>>,
    payload: Option<Json<TokenBody>>,
) -> Response {
    let Some(Json(body)) = payload else {
        return missing_payload();
    };

    match core.revoke(&body.token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}
