// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat history endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sitesmith_core::SitesmithError;
use sitesmith_storage::queries::{chats, messages};
use sitesmith_storage::{Chat, Page, StoredMessage};
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::handlers::ProjectView;
use crate::AppState;

/// `?limit=&offset=` for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<PageQuery> for Page {
    fn from(query: PageQuery) -> Self {
        let default = Page::default();
        Page::new(
            query.limit.unwrap_or(default.limit),
            query.offset.unwrap_or(default.offset),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ChatList {
    pub chats: Vec<Chat>,
}

#[derive(Debug, Serialize)]
pub struct MessageList {
    pub messages: Vec<StoredMessage>,
}

#[derive(Debug, Serialize)]
pub struct ProjectList {
    pub projects: Vec<ProjectView>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub status: &'static str,
}

async fn require_chat(
    state: &AppState,
    cancel: &CancellationToken,
    id: i64,
) -> Result<Chat, SitesmithError> {
    chats::get_chat(state.db(), cancel, id)
        .await?
        .ok_or(SitesmithError::NotFound { entity: "chat", id })
}

/// GET /chats
pub async fn list_chats(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ChatList>, ApiError> {
    let (cancel, _guard) = state.request_token();
    let chats = chats::list_chats(state.db(), &cancel, page.into()).await?;
    Ok(Json(ChatList { chats }))
}

/// GET /chats/{id}
pub async fn get_chat(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Chat>, ApiError> {
    let (cancel, _guard) = state.request_token();
    Ok(Json(require_chat(&state, &cancel, id).await?))
}

/// GET /chats/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> Result<Json<MessageList>, ApiError> {
    let (cancel, _guard) = state.request_token();
    require_chat(&state, &cancel, id).await?;
    let messages = messages::list_messages(state.db(), &cancel, id, page.into()).await?;
    Ok(Json(MessageList { messages }))
}

/// GET /chats/{id}/projects
pub async fn list_projects(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ProjectList>, ApiError> {
    let (cancel, _guard) = state.request_token();
    require_chat(&state, &cancel, id).await?;
    let projects = state
        .artifacts
        .list_projects(&cancel, id, page.into())
        .await?
        .into_iter()
        .map(ProjectView::from)
        .collect();
    Ok(Json(ProjectList { projects }))
}

/// DELETE /chats/{id}
///
/// Removes the chat with its messages, projects and images. Artifact files
/// stay on disk.
pub async fn delete_chat(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    let (cancel, _guard) = state.request_token();
    chats::delete_chat(state.db(), &cancel, id).await?;
    tracing::info!(chat_id = id, "chat deleted");
    Ok(Json(Deleted { status: "success" }))
}
