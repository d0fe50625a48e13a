//! Router integration tests
//!
//! The full router without a database: authentication is enforced and
//! DB-backed routes answer 503 instead of failing.

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crate::common::{app_without_database, auth_header, generate_test_token, send};

fn bearer() -> String {
    auth_header(&generate_test_token(Uuid::new_v4(), "alice"))
}

#[tokio::test]
async fn test_public_route_without_database_is_unavailable() {
    let (status, body) = send(app_without_database(), Method::GET, "/api/discussions", None, None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], 503);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let (status, _) = send(app_without_database(), Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        app_without_database(),
        Method::POST,
        "/api/discussions/create/Traits",
        Some("Bearer not-a-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authenticated_request_reaches_handler() {
    let token = bearer();
    let (status, _) = send(
        app_without_database(),
        Method::POST,
        "/api/discussions/create/Traits",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_token_accepted_from_query() {
    let token = generate_test_token(Uuid::new_v4(), "alice");
    let uri = format!("/api/discussions/{}/details?token={}", Uuid::new_v4(), token);

    let (status, _) = send(app_without_database(), Method::GET, &uri, None, None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_is_authenticated() {
    let token = bearer();
    let (status, body) = send(
        app_without_database(),
        Method::GET,
        "/api/auth/is-authenticated",
        Some(&token),
        None,
    )
    .await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "true"));

    let (status, body) = send(
        app_without_database(),
        Method::GET,
        "/api/auth/is-authenticated",
        None,
        None,
    )
    .await;
    assert_eq!((status, body.as_str()), (StatusCode::UNAUTHORIZED, "false"));
}

#[tokio::test]
async fn test_register_without_database() {
    let (status, _) = send(
        app_without_database(),
        Method::POST,
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "username": "alice",
            "password": "password123",
            "confirmPassword": "password123"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, body) = send(app_without_database(), Method::GET, "/api/nothing-here", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "Not found");
}
