// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! POST /build and POST /build/single-shot.
//!
//! A build counts against the user's daily limit, records the request in a
//! chat, runs the pipeline, persists the artifact and optionally publishes
//! it. A publication failure after a successful build is `partial_success`.

use axum::{extract::State, Json};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sitesmith_core::{PushRequest, Requirements, Role, SitesmithError};
use sitesmith_dialog::normalize_user_id;
use sitesmith_storage::queries::{chats, messages, requests};
use sitesmith_storage::{ArtifactDraft, PersistedArtifact};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::handlers::PublishTarget;
use crate::AppState;

const CHAT_TITLE_CHARS: usize = 50;

/// Request body for both build endpoints.
#[derive(Debug, Deserialize)]
pub struct BuildRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: String,
    /// Explicit requirements; the user's dialog session is used when absent.
    #[serde(default)]
    pub requirements: Option<Requirements>,
    /// Existing chat to attach the build to; a new chat is created otherwise.
    #[serde(default)]
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub publish: Option<PublishTarget>,
}

/// Response body for both build endpoints.
#[derive(Debug, Serialize)]
pub struct BuildResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
    pub chat_id: i64,
    pub project_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildMode {
    Staged,
    SingleShot,
}

/// POST /build
pub async fn post_build(
    State(state): State<AppState>,
    Json(body): Json<BuildRequest>,
) -> Result<Json<BuildResponse>, ApiError> {
    run_build(state, body, BuildMode::Staged).await
}

/// POST /build/single-shot
pub async fn post_build_single_shot(
    State(state): State<AppState>,
    Json(body): Json<BuildRequest>,
) -> Result<Json<BuildResponse>, ApiError> {
    run_build(state, body, BuildMode::SingleShot).await
}

async fn run_build(
    state: AppState,
    body: BuildRequest,
    mode: BuildMode,
) -> Result<Json<BuildResponse>, ApiError> {
    let requested_at = Local::now();
    let user_id = normalize_user_id(&body.user_id).to_string();
    if body.message.trim().is_empty() {
        return Err(ApiError::bad_request("message is required"));
    }

    let (cancel, _guard) = state.request_token();
    enforce_daily_limit(&state, &cancel, &user_id, requested_at.date_naive()).await?;

    let requirements = match body.requirements {
        Some(requirements) => requirements,
        None => state
            .dialog
            .store()
            .snapshot(&user_id)
            .await
            .map(|session| session.requirements)
            .unwrap_or_default(),
    };

    let chat_id = match body.chat_id {
        Some(id) => {
            chats::get_chat(state.db(), &cancel, id)
                .await?
                .ok_or(SitesmithError::NotFound { entity: "chat", id })?
                .id
        }
        None => chats::create_chat(state.db(), &cancel, &chat_title(&body.message)).await?.id,
    };
    messages::create_message(state.db(), &cancel, chat_id, Role::User, &body.message).await?;

    let draft = ArtifactDraft {
        chat_id,
        name: project_name(&requirements, &body.message),
        description: body.message.clone(),
    };

    info!(user_id = %user_id, chat_id, ?mode, "build started");
    let generated = match mode {
        BuildMode::Staged => {
            state
                .pipeline
                .generate_website(&body.message, &requirements)
                .await
        }
        BuildMode::SingleShot => {
            state
                .pipeline
                .generate_website_single_shot(&body.message, &requirements)
                .await
        }
    };

    let html = match generated {
        Ok(html) => html,
        Err(e) => {
            warn!(user_id = %user_id, chat_id, error = %e, "build failed");
            if let Err(record_err) = state.artifacts.record_failure(&cancel, &draft).await {
                warn!(chat_id, error = %record_err, "failed to record failed project");
            }
            return Err(ApiError::with_context("Ошибка генерации сайта", &e));
        }
    };

    let artifact = state
        .artifacts
        .persist(&cancel, &draft, &html, requested_at)
        .await
        .map_err(|e| ApiError::with_context("Ошибка сохранения файла", &e))?;

    let note = format!("Сайт сгенерирован: {}", artifact.filename);
    if let Err(e) =
        messages::create_message(state.db(), &cancel, chat_id, Role::Assistant, &note).await
    {
        warn!(chat_id, error = %e, "failed to record build reply");
    }

    let response = match body.publish {
        None => BuildResponse {
            status: "success",
            message: "Сайт успешно сгенерирован и сохранен".to_string(),
            ..BuildResponse::for_artifact(&artifact)
        },
        Some(target) => publish_artifact(&state, &artifact, target).await,
    };

    info!(
        user_id = %user_id,
        filename = %artifact.filename,
        status = response.status,
        "build finished"
    );
    Ok(Json(response))
}

impl BuildResponse {
    fn for_artifact(artifact: &PersistedArtifact) -> Self {
        Self {
            status: "success",
            message: String::new(),
            file: Some(artifact.filename.clone()),
            github_url: None,
            remote_path: None,
            chat_id: artifact.project.chat_id,
            project_id: artifact.project.id,
        }
    }
}

async fn publish_artifact(
    state: &AppState,
    artifact: &PersistedArtifact,
    target: PublishTarget,
) -> BuildResponse {
    let base = BuildResponse::for_artifact(artifact);
    match target {
        PublishTarget::Github => {
            let push = PushRequest::for_artifact(
                &artifact.absolute_path.to_string_lossy(),
                &artifact.filename,
            );
            match state.repository.push(&push).await {
                Ok(url) => BuildResponse {
                    message: "Сайт успешно сгенерирован, сохранен и отправлен в GitHub".to_string(),
                    github_url: Some(url).filter(|u| !u.is_empty()),
                    ..base
                },
                Err(e) => {
                    warn!(filename = %artifact.filename, error = %e, "repository push failed");
                    BuildResponse {
                        status: "partial_success",
                        message: format!(
                            "Сайт сгенерирован и сохранен локально, но не удалось отправить в GitHub: {e}"
                        ),
                        ..base
                    }
                }
            }
        }
        PublishTarget::ObjectStorage => {
            let html = match state.artifacts.read(&artifact.filename).await {
                Ok(Some(html)) => html,
                Ok(None) => {
                    return BuildResponse {
                        status: "partial_success",
                        message: "Сайт сгенерирован, но файл не найден для публикации".to_string(),
                        ..base
                    };
                }
                Err(e) => {
                    return BuildResponse {
                        status: "partial_success",
                        message: format!(
                            "Сайт сгенерирован и сохранен локально, но не удалось прочитать файл: {e}"
                        ),
                        ..base
                    };
                }
            };
            match state.object_storage.publish(&artifact.filename, &html).await {
                Ok(receipt) => BuildResponse {
                    message: "Сайт успешно сгенерирован, сохранен и опубликован".to_string(),
                    remote_path: Some(receipt.remote_path),
                    ..base
                },
                Err(e) => {
                    warn!(filename = %artifact.filename, error = %e, "object storage upload failed");
                    BuildResponse {
                        status: "partial_success",
                        message: format!(
                            "Сайт сгенерирован и сохранен локально, но не удалось опубликовать: {e}"
                        ),
                        ..base
                    }
                }
            }
        }
    }
}

/// Counts this build and rejects it when the user is over the daily limit.
///
/// The increment is a single UPSERT, so concurrent builds cannot both slip
/// under the limit.
async fn enforce_daily_limit(
    state: &AppState,
    cancel: &CancellationToken,
    user_id: &str,
    today: NaiveDate,
) -> Result<(), ApiError> {
    let count = requests::increment_request_count(state.db(), cancel, user_id, today).await?;
    match state.daily_builds {
        Some(limit) if count > limit => {
            warn!(user_id, count, limit, "daily build limit reached");
            Err(ApiError::too_many_requests(format!(
                "Дневной лимит генераций исчерпан ({limit})"
            )))
        }
        _ => Ok(()),
    }
}

fn chat_title(message: &str) -> String {
    message.trim().chars().take(CHAT_TITLE_CHARS).collect()
}

fn project_name(requirements: &Requirements, message: &str) -> String {
    if requirements.site_type.trim().is_empty() {
        chat_title(message)
    } else {
        requirements.site_type.trim().to_string()
    }
}
