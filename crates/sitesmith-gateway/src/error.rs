// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from `SitesmithError` to HTTP responses.
//!
//! Input errors are 400, missing rows and files are 404, an exhausted daily
//! limit is 429. Everything else keeps HTTP 200 and reports
//! `status: "error"` in the body, which existing clients rely on.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sitesmith_core::{ErrorCategory, SitesmithError};

/// Body of every `status: "error"` response.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub status: &'static str,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

/// HTTP status for an error at the boundary.
pub fn status_for(error: &SitesmithError) -> StatusCode {
    if error.is_not_found() {
        return StatusCode::NOT_FOUND;
    }
    match error.category() {
        ErrorCategory::Input => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    }
}

/// Error returned from handlers; renders as an [`ErrorEnvelope`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Wraps `error`, prefixing its message with `context` when given.
    pub fn with_context(context: &str, error: &SitesmithError) -> Self {
        let message = if context.is_empty() {
            error.to_string()
        } else {
            format!("{context}: {error}")
        };
        Self {
            status: status_for(error),
            message,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<SitesmithError> for ApiError {
    fn from(error: SitesmithError) -> Self {
        Self::with_context("", &error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorEnvelope::new(self.message))).into_response()
    }
}
