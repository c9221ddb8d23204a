// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! API error handling with structured `{error, message}` responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::session::SessionError;
use crate::infrastructure::auth::AuthError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(#[from] AuthError),

    #[error("{0}")]
    DuplicateSession(String),

    #[error("{0}")]
    InvalidMode(String),

    #[error("{0}")]
    InvalidRequest(String),
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::DuplicateSession(_) => StatusCode::CONFLICT,
            Self::InvalidMode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::DuplicateSession(_) => "duplicate_session",
            Self::InvalidMode(_) => "invalid_mode",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::DuplicateSession(_) => Self::DuplicateSession(err.to_string()),
            SessionError::InvalidMode(_) => Self::InvalidMode(err.to_string()),
            SessionError::InvalidSessionId(_) | SessionError::InvalidContainerId => {
                Self::InvalidRequest(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        debug!(status = status.as_u16(), error = self.error_code(), "{}", self);

        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
