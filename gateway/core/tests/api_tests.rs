// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use repogate_core::application::{AccessCheckService, SessionService};
use repogate_core::domain::legacy::{GlobalModePolicy, LegacyModeConfig};
use repogate_core::domain::visibility::{RepositoryRef, RepositoryVisibility};
use repogate_core::infrastructure::visibility::StaticVisibilityResolver;
use repogate_core::infrastructure::{InMemorySessionRepository, SharedSecretGuard};
use repogate_core::presentation::{app, GatewayState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const SECRET: &str = "test-shared-secret";

fn test_app(legacy: LegacyModeConfig) -> Router {
    let sessions = Arc::new(InMemorySessionRepository::new(chrono::Duration::hours(24)));
    let resolver = Arc::new(StaticVisibilityResolver::new(
        [
            (RepositoryRef::new("octo", "private"), RepositoryVisibility::Private),
            (RepositoryRef::new("octo", "public"), RepositoryVisibility::Public),
            (RepositoryRef::new("octo", "inner"), RepositoryVisibility::Internal),
        ],
        None,
    ));
    let legacy = Arc::new(GlobalModePolicy::from_config(legacy).unwrap());

    let state = GatewayState::new(
        SharedSecretGuard::new(SECRET).unwrap(),
        SessionService::new(sessions.clone()),
        AccessCheckService::new(sessions, resolver, legacy, Duration::from_secs(1)),
    );
    app(Arc::new(state))
}

fn authed(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", SECRET));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn register(app: &Router, session_id: &str, container_id: &str, mode: &str) -> (StatusCode, Value) {
    send(
        app,
        authed(
            Method::POST,
            "/api/v1/sessions",
            Some(json!({ "session_id": session_id, "container_id": container_id, "mode": mode })),
        ),
    )
    .await
}

async fn check(app: &Router, session_id: Option<&str>, op: &str, repo: &str) -> Value {
    let mut body = json!({ "operation_class": op, "repo": repo });
    if let Some(id) = session_id {
        body["session_id"] = json!(id);
    }
    let (status, json) = send(app, authed(Method::POST, "/api/v1/check", Some(body))).await;
    assert_eq!(status, StatusCode::OK);
    json
}

#[tokio::test]
async fn test_health_endpoint_needs_no_auth() {
    let app = test_app(LegacyModeConfig::default());
    register(&app, "abc123", "jib-A", "private").await;

    let (status, json) = send(
        &app,
        Request::builder()
            .uri("/health")
            .method(Method::GET)
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["active_sessions"], 1);
}

#[tokio::test]
async fn test_api_requires_shared_secret() {
    let app = test_app(LegacyModeConfig::default());
    let body = json!({ "session_id": "abc123", "container_id": "jib-A", "mode": "private" });

    let (status, json) = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/sessions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");

    let (status, _) = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/sessions")
            .header(header::AUTHORIZATION, "Bearer wrong-secret")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Rejected before reaching the store: the id is still free.
    let (status, _) = register(&app, "abc123", "jib-A", "private").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_session() {
    let app = test_app(LegacyModeConfig::default());

    let (status, json) = register(&app, "abc123", "jib-A", "Private").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["session_id"], "abc123");
    assert_eq!(json["container_id"], "jib-A");
    assert_eq!(json["mode"], "private");
    assert!(json["expires_at"].is_string());

    let (status, json) = register(&app, "abc123", "jib-B", "public").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "duplicate_session");

    let (status, json) = register(&app, "def456", "jib-C", "shared").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "invalid_mode");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app(LegacyModeConfig::default());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/check")
        .header(header::AUTHORIZATION, format!("Bearer {}", SECRET))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");

    let (status, _) = send(
        &app,
        authed(Method::POST, "/api/v1/sessions", Some(json!({ "session_id": "x" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_two_containers_with_different_modes() {
    let app = test_app(LegacyModeConfig::default());
    register(&app, "abc123", "jib-A", "private").await;
    register(&app, "xyz789", "jib-B", "public").await;

    assert_eq!(
        check(&app, Some("abc123"), "remote", "octo/private").await,
        json!({ "allow": true })
    );
    assert_eq!(
        check(&app, Some("abc123"), "remote", "octo/public").await,
        json!({ "allow": false, "reason": "remote operation blocked for public repo in private mode" })
    );
    assert_eq!(
        check(&app, Some("xyz789"), "local", "octo/private").await,
        json!({ "allow": false, "reason": "private repository not accessible in public mode" })
    );
    assert_eq!(check(&app, Some("xyz789"), "remote", "octo/public").await["allow"], true);
    assert_eq!(check(&app, Some("abc123"), "local", "octo/inner").await["allow"], true);
}

#[tokio::test]
async fn test_unregister_falls_back_to_legacy() {
    let app = test_app(LegacyModeConfig {
        private_only: true,
        public_only: false,
    });
    register(&app, "xyz789", "jib-B", "public").await;
    assert_eq!(check(&app, Some("xyz789"), "remote", "octo/private").await["allow"], false);

    let (status, _) = send(&app, authed(Method::DELETE, "/api/v1/sessions/xyz789", None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    // Idempotent
    let (status, _) = send(&app, authed(Method::DELETE, "/api/v1/sessions/xyz789", None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Now decided by the global private-only switch
    assert_eq!(check(&app, Some("xyz789"), "remote", "octo/private").await["allow"], true);
    assert_eq!(check(&app, Some("xyz789"), "remote", "octo/public").await["allow"], false);
}

#[tokio::test]
async fn test_session_header_is_honoured() {
    let app = test_app(LegacyModeConfig::default());
    register(&app, "xyz789", "jib-B", "public").await;

    let mut request = authed(
        Method::POST,
        "/api/v1/check",
        Some(json!({ "operation_class": "local", "repo": "octo/private" })),
    );
    request
        .headers_mut()
        .insert("x-repogate-session", "xyz789".parse().unwrap());

    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["allow"], false);

    // Without the header there is no session and no legacy switch.
    assert_eq!(check(&app, None, "local", "octo/private").await["allow"], true);
}

#[tokio::test]
async fn test_unresolved_visibility_is_denied() {
    let app = test_app(LegacyModeConfig::default());
    register(&app, "abc123", "jib-A", "private").await;
    register(&app, "xyz789", "jib-B", "public").await;

    for session_id in [Some("abc123"), Some("xyz789"), None] {
        for op in ["local", "remote", "push"] {
            assert_eq!(
                check(&app, session_id, op, "octo/unknown").await,
                json!({ "allow": false, "reason": "repository visibility could not be resolved" })
            );
        }
    }
}

#[tokio::test]
async fn test_incomplete_check_is_a_denial_not_an_error() {
    let app = test_app(LegacyModeConfig::default());
    register(&app, "abc123", "jib-A", "private").await;

    // No operation class: treated as remote.
    let (status, json) = send(
        &app,
        authed(
            Method::POST,
            "/api/v1/check",
            Some(json!({ "session_id": "abc123", "repo": "octo/public" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({ "allow": false, "reason": "remote operation blocked for public repo in private mode" })
    );

    // Empty or missing repo: visibility cannot be resolved.
    for body in [
        json!({ "session_id": "abc123", "operation_class": "remote", "repo": "" }),
        json!({ "session_id": "abc123", "operation_class": "local" }),
    ] {
        let (status, json) = send(&app, authed(Method::POST, "/api/v1/check", Some(body))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["allow"], false);
    }
}

#[tokio::test]
async fn test_empty_body_session_id_defers_to_header() {
    let app = test_app(LegacyModeConfig::default());
    register(&app, "xyz789", "jib-B", "public").await;

    let mut request = authed(
        Method::POST,
        "/api/v1/check",
        Some(json!({ "session_id": "", "operation_class": "local", "repo": "octo/private" })),
    );
    request
        .headers_mut()
        .insert("x-repogate-session", "xyz789".parse().unwrap());

    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({ "allow": false, "reason": "private repository not accessible in public mode" })
    );
}

#[tokio::test]
async fn test_padded_secret_is_rejected() {
    let app = test_app(LegacyModeConfig::default());

    for credential in [format!("Bearer  {}", SECRET), format!("Bearer {} ", SECRET)] {
        let (status, json) = send(
            &app,
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/check")
                .header(header::AUTHORIZATION, credential)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "operation_class": "local", "repo": "octo/public" }).to_string()))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "unauthorized");
    }
}
