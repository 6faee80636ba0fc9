// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the dialog, publication and utility endpoints.
//!
//! Handles GET /health, POST /ask, GET /requirements, POST /publish,
//! POST /clear and GET /latest. Builds live in [`crate::build`], chat
//! history in [`crate::chats`].

use std::path::Path;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sitesmith_core::{
    DialogMessage, HealthStatus, PluginAdapter, PushRequest, Requirements, SitesmithError,
};
use sitesmith_dialog::{normalize_user_id, render_history, CurrentQuestion, DialogSession};
use sitesmith_pipeline::sanitize;
use sitesmith_storage::Project;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::AppState;

/// Where a finished artifact should be published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishTarget {
    /// Commit to the remote repository through the push sidecar.
    #[serde(alias = "repository")]
    Github,
    /// Upload to the object-storage deploy sidecar.
    #[serde(alias = "ycloud")]
    ObjectStorage,
}

/// A project row plus the artifact filename clients link to.
#[derive(Debug, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl From<Project> for ProjectView {
    fn from(project: Project) -> Self {
        let file = Path::new(&project.file_path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Self { project, file }
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub storage: String,
}

/// GET /health
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, storage) = match state.db().health_check().await {
        Ok(HealthStatus::Healthy) => ("ok", "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => ("degraded", format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => ("degraded", format!("unhealthy: {reason}")),
        Err(e) => ("degraded", format!("unhealthy: {e}")),
    };
    Json(HealthResponse {
        status,
        service: "sitesmith",
        version: env!("CARGO_PKG_VERSION"),
        storage,
    })
}

/// Request body for POST /ask.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: String,
}

/// Response body for POST /ask.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub status: &'static str,
    pub message: String,
}

/// POST /ask
///
/// One requirements-gathering turn. A blank message is a 400; upstream
/// failures keep HTTP 200 and report `status: "error"`.
pub async fn post_ask(State(state): State<AppState>, Json(body): Json<AskRequest>) -> Response {
    let user_id = normalize_user_id(&body.user_id);
    info!(user_id, bytes = body.message.len(), "ask request");

    match state.dialog.ask(user_id, &body.message).await {
        Ok(reply) => (
            StatusCode::OK,
            Json(AskResponse {
                status: "success",
                message: reply.message,
            }),
        )
            .into_response(),
        Err(e @ SitesmithError::Input(_)) => ApiError::from(e).into_response(),
        Err(e) => (
            StatusCode::OK,
            Json(AskResponse {
                status: "error",
                message: format!("Ошибка обработки запроса: {e}"),
            }),
        )
            .into_response(),
    }
}

/// Query for GET /requirements.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub user_id: String,
}

/// Response body for GET /requirements.
#[derive(Debug, Serialize)]
pub struct RequirementsResponse {
    pub status: &'static str,
    pub requirements: Requirements,
    pub is_complete: bool,
    pub current_question: CurrentQuestion,
    pub history: Vec<DialogMessage>,
    /// The history as the dialog prompt sees it.
    pub transcript: String,
}

/// GET /requirements
pub async fn get_requirements(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<RequirementsResponse> {
    let user_id = normalize_user_id(&query.user_id);
    let session = state
        .dialog
        .store()
        .snapshot(user_id)
        .await
        .unwrap_or_else(|| DialogSession::new(user_id));
    let transcript = render_history(&session.history);
    Json(RequirementsResponse {
        status: "success",
        requirements: session.requirements,
        is_complete: session.is_complete,
        current_question: session.current_question,
        history: session.history,
        transcript,
    })
}

/// Request body for POST /clear.
#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    pub raw_html: String,
    #[serde(default)]
    pub user_id: String,
}

/// Response body for POST /clear.
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub status: &'static str,
    pub clean_html: String,
}

/// POST /clear
pub async fn post_clear(Json(body): Json<ClearRequest>) -> Json<ClearResponse> {
    let clean_html = sanitize(&body.raw_html);
    info!(
        user_id = normalize_user_id(&body.user_id),
        raw_bytes = body.raw_html.len(),
        clean_bytes = clean_html.len(),
        "html cleaned"
    );
    Json(ClearResponse {
        status: "success",
        clean_html,
    })
}

/// Response body for GET /latest.
#[derive(Debug, Serialize)]
pub struct LatestResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectView>,
}

/// GET /latest
pub async fn get_latest(State(state): State<AppState>) -> Result<Json<LatestResponse>, ApiError> {
    let (cancel, _guard) = state.request_token();
    let project = state.artifacts.latest(&cancel).await?;
    Ok(Json(LatestResponse {
        status: "success",
        project: project.map(ProjectView::from),
    }))
}

/// Request body for POST /publish.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub target: Option<PublishTarget>,
}

/// Response body for POST /publish.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_url: Option<String>,
}

/// Error body for rejected POST /publish requests.
#[derive(Debug, Serialize)]
pub struct PublishError {
    pub error: String,
}

fn publish_rejected(status: StatusCode, error: String) -> Response {
    (status, Json(PublishError { error })).into_response()
}

/// POST /publish
///
/// Publishes an existing artifact from the result directory. Defaults to
/// object storage.
pub async fn post_publish(
    State(state): State<AppState>,
    Json(body): Json<PublishRequest>,
) -> Response {
    if body.filename.trim().is_empty() {
        return publish_rejected(StatusCode::BAD_REQUEST, "filename is required".into());
    }
    if body.user_id.trim().is_empty() {
        return publish_rejected(StatusCode::BAD_REQUEST, "user_id is required".into());
    }

    let filename = body.filename.trim().to_string();
    let path = match state.artifacts.resolve(&filename) {
        Ok(path) => path,
        Err(e) => return publish_rejected(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let html = match state.artifacts.read(&filename).await {
        Ok(Some(html)) => html,
        Ok(None) => {
            return publish_rejected(
                StatusCode::NOT_FOUND,
                format!("File {filename} not found in result directory"),
            );
        }
        Err(e) => return publish_rejected(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let target = body.target.unwrap_or(PublishTarget::ObjectStorage);
    info!(user_id = %body.user_id, filename = %filename, ?target, "publish request");

    let mut response = PublishResponse {
        success: false,
        message: String::new(),
        filename: filename.clone(),
        user_id: body.user_id.clone(),
        remote_path: None,
        commit_url: None,
    };

    let outcome: Result<(), SitesmithError> = match target {
        PublishTarget::ObjectStorage => state
            .object_storage
            .publish(&filename, &html)
            .await
            .map(|receipt| {
                response.message = format!("File {filename} successfully deployed to object storage");
                response.remote_path = Some(receipt.remote_path);
            }),
        PublishTarget::Github => {
            let push = PushRequest::for_artifact(&path.to_string_lossy(), &filename);
            state.repository.push(&push).await.map(|url| {
                response.message = format!("File {filename} successfully pushed to the repository");
                response.commit_url = Some(url).filter(|u| !u.is_empty());
            })
        }
    };

    match outcome {
        Ok(()) => {
            response.success = true;
        }
        Err(e) => {
            warn!(filename = %filename, error = %e, "publish failed");
            response.message = e.to_string();
        }
    }
    (StatusCode::OK, Json(response)).into_response()
}
