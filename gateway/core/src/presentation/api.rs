// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::application::access_check::{AccessCheckRequest, AccessCheckService};
use crate::application::session_service::SessionService;
use crate::domain::policy::PolicyDecision;
use crate::domain::session::Session;
use crate::infrastructure::auth::SharedSecretGuard;
use crate::presentation::error::ApiError;

/// Header a wrapper may use instead of the `session_id` body field.
pub const SESSION_HEADER: &str = "x-repogate-session";

pub struct GatewayState {
    pub guard: SharedSecretGuard,
    pub sessions: SessionService,
    pub access_check: AccessCheckService,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(
        guard: SharedSecretGuard,
        sessions: SessionService,
        access_check: AccessCheckService,
    ) -> Self {
        Self {
            guard,
            sessions,
            access_check,
            started_at: Instant::now(),
        }
    }
}

pub fn app(state: Arc<GatewayState>) -> Router {
    let api = Router::new()
        .route("/sessions", post(register_session))
        .route("/sessions/{session_id}", delete(unregister_session))
        .route("/check", post(check_operation))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_shared_secret));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn require_shared_secret(
    State(state): State<Arc<GatewayState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(e) = state.guard.verify(bearer_token(request.headers())) {
        warn!(method = %request.method(), path = %request.uri().path(), "Rejected API request: {}", e);
        return Err(e.into());
    }
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterSessionRequest {
    pub session_id: String,
    pub container_id: String,
    pub mode: String,
}

async fn register_session(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<RegisterSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let Json(payload) = payload?;
    let session = state
        .sessions
        .register(&payload.session_id, &payload.container_id, &payload.mode)?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn unregister_session(
    State(state): State<Arc<GatewayState>>,
    Path(session_id): Path<String>,
) -> StatusCode {
    state.sessions.unregister(&session_id);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    /// Missing or unrecognised classes are treated as remote.
    #[serde(default)]
    pub operation_class: String,
    /// Missing or unparseable repositories resolve to no visibility.
    #[serde(default)]
    pub repo: String,
}

async fn check_operation(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<PolicyDecision>, ApiError> {
    let Json(payload) = payload?;

    let session_id = payload.session_id.filter(|id| !id.is_empty()).or_else(|| {
        headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    });

    let request = AccessCheckRequest {
        session_id,
        operation_class: payload.operation_class,
        repo: payload.repo,
    };
    Ok(Json(state.access_check.check(&request).await))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub active_sessions: usize,
    pub uptime_seconds: u64,
}

async fn health(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_sessions: state.sessions.active_sessions(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
