use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    response::Response,
    Router,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use sesame::{
    api,
    auth::{AuthConfig, AuthCore, MemoryRevocationStore, MemoryUserStore},
};
use std::sync::Arc;
use tower::ServiceExt;

const SIGNING_KEY: &str = "integration-signing-key-0123456789";

fn app() -> Router {
    let config = AuthConfig::new(SecretString::from(SIGNING_KEY));
    let core = AuthCore::new(
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemoryRevocationStore::new()),
        &config,
    );
    api::app(Arc::new(core), None)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Result<Response> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };
    Ok(app.clone().oneshot(request).await?)
}

async fn json_body(response: Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn sign_up_and_in(app: &Router, username: &str, password: &str) -> Result<(Value, String)> {
    let credentials = json!({ "username": username, "password": password });

    let response = send(app, Method::POST, "/v1/auth/signup", Some(credentials.clone())).await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let user = json_body(response).await?;

    let response = send(app, Method::POST, "/v1/auth/signin", Some(credentials)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let token = json_body(response).await?["token"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    assert!(!token.is_empty());

    Ok((user, token))
}

#[tokio::test]
async fn health_reports_memory_storage() -> Result<()> {
    let app = app();
    let response = send(&app, Method::GET, "/health", None).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-app"));
    assert!(response.headers().contains_key("x-request-id"));

    let body = json_body(response).await?;
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(body["database"], "memory");
    Ok(())
}

#[tokio::test]
async fn request_id_is_propagated() -> Result<()> {
    let app = app();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "01J0000000000000000000TEST")
        .body(Body::empty())?;
    let response = app.oneshot(request).await?;

    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("01J0000000000000000000TEST")
    );
    Ok(())
}

#[tokio::test]
async fn signup_response_hides_hash() -> Result<()> {
    let app = app();
    let (user, _) = sign_up_and_in(&app, "alice", "correct horse").await?;

    assert_eq!(user["username"], "alice");
    assert!(user["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(user.get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn signup_errors_map_to_statuses() -> Result<()> {
    let app = app();
    sign_up_and_in(&app, "alice", "correct horse").await?;

    let duplicate = json!({ "username": "alice", "password": "other" });
    let response = send(&app, Method::POST, "/v1/auth/signup", Some(duplicate)).await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let empty = json!({ "username": "", "password": "secret" });
    let response = send(&app, Method::POST, "/v1/auth/signup", Some(empty)).await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = send(&app, Method::POST, "/v1/auth/signup", None).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn signin_errors_map_to_statuses() -> Result<()> {
    let app = app();
    sign_up_and_in(&app, "alice", "correct horse").await?;

    let unknown = json!({ "username": "bob", "password": "correct horse" });
    let response = send(&app, Method::POST, "/v1/auth/signin", Some(unknown)).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let wrong = json!({ "username": "alice", "password": "wrong" });
    let response = send(&app, Method::POST, "/v1/auth/signin", Some(wrong)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn verify_then_signout() -> Result<()> {
    let app = app();
    let (_, token) = sign_up_and_in(&app, "alice", "correct horse").await?;

    let response = send(
        &app,
        Method::POST,
        "/v1/auth/verify",
        Some(json!({ "token": token })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?["username"], "alice");

    let response = send(
        &app,
        Method::POST,
        "/v1/auth/signout",
        Some(json!({ "token": token })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        Method::POST,
        "/v1/auth/verify",
        Some(json!({ "token": token })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_unauthorized() -> Result<()> {
    let app = app();
    let response = send(
        &app,
        Method::POST,
        "/v1/auth/verify",
        Some(json!({ "token": "not.a.token" })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn profile_update_revokes_token() -> Result<()> {
    let app = app();
    let (_, token) = sign_up_and_in(&app, "alice", "correct horse").await?;

    let response = send(
        &app,
        Method::PATCH,
        "/v1/users/profile",
        Some(json!({
            "filter": { "username": "alice" },
            "patch": { "username": "alice2" },
            "token": token,
        })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?["username"], "alice2");

    let response = send(
        &app,
        Method::POST,
        "/v1/auth/verify",
        Some(json!({ "token": token })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let credentials = json!({ "username": "alice2", "password": "correct horse" });
    let response = send(&app, Method::POST, "/v1/auth/signin", Some(credentials)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn signup_profile_keeps_token_valid() -> Result<()> {
    let app = app();
    let (_, token) = sign_up_and_in(&app, "alice", "correct horse").await?;

    let response = send(
        &app,
        Method::PATCH,
        "/v1/users/signup-profile",
        Some(json!({
            "filter": { "username": "alice" },
            "patch": { "legacy_id": 7 },
        })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?["legacy_id"], 7);

    let response = send(
        &app,
        Method::POST,
        "/v1/auth/verify",
        Some(json!({ "token": token })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn profile_update_of_missing_user_is_not_found() -> Result<()> {
    let app = app();
    let (_, token) = sign_up_and_in(&app, "alice", "correct horse").await?;

    let response = send(
        &app,
        Method::PATCH,
        "/v1/users/profile",
        Some(json!({
            "filter": { "username": "nobody" },
            "patch": { "username": "someone" },
            "token": token,
        })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_user_then_token_is_dead() -> Result<()> {
    let app = app();
    let (user, token) = sign_up_and_in(&app, "alice", "correct horse").await?;

    let response = send(
        &app,
        Method::DELETE,
        "/v1/users",
        Some(json!({ "user": { "id": user["id"] }, "token": token })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?, json!({ "response": "Ok" }));

    let response = send(
        &app,
        Method::POST,
        "/v1/auth/verify",
        Some(json!({ "token": token })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        Method::DELETE,
        "/v1/users",
        Some(json!({ "user": { "id": user["id"] }, "token": token })),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> Result<()> {
    let app = app();
    let response = send(&app, Method::GET, "/openapi.json", None).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = json_body(response).await?;
    assert!(doc["paths"]["/v1/auth/signin"].is_object());
    Ok(())
}
