//! Router request helpers
//!
//! Drive the assembled router in-process with `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use discussion_board::backend::routes::create_router;
use discussion_board::backend::server::{build_state, ServerConfig};

/// Router without a database, as when `DATABASE_URL` is unset
pub fn app_without_database() -> Router {
    create_router(build_state(None, ServerConfig::default()))
}

/// Send one request and return the status and body text
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    authorization: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
