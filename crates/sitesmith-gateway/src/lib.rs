// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Sitesmith website builder.
//!
//! Wires the requirements dialog, the generation pipeline, storage and the
//! publication adapters into the JSON endpoints used by the web client.

pub mod build;
pub mod chats;
pub mod error;
pub mod handlers;
pub mod server;

use std::sync::Arc;

use sitesmith_core::{ObjectStoragePublisher, RepositoryPublisher};
use sitesmith_dialog::RequirementsDialog;
use sitesmith_pipeline::WebsitePipeline;
use sitesmith_storage::{ArtifactStore, Database};
use tokio_util::sync::{CancellationToken, DropGuard};

pub use error::{ApiError, ErrorEnvelope};
pub use server::{build_router, start_server, ServerConfig};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Requirements dialog over the gathering model.
    pub dialog: Arc<RequirementsDialog>,
    /// Website pipeline over the builder model.
    pub pipeline: Arc<WebsitePipeline>,
    /// Artifact files and the database behind them.
    pub artifacts: ArtifactStore,
    pub object_storage: Arc<dyn ObjectStoragePublisher>,
    pub repository: Arc<dyn RepositoryPublisher>,
    /// Builds allowed per user per local day. `None` means unlimited.
    pub daily_builds: Option<u32>,
    /// Cancelled on shutdown; every request works under a child of it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn db(&self) -> &Database {
        self.artifacts.database()
    }

    /// A token tied to the current request.
    ///
    /// It is cancelled when the returned guard drops, which happens when the
    /// handler finishes or its future is dropped by a disconnecting client,
    /// and also when the server shuts down.
    pub fn request_token(&self) -> (CancellationToken, DropGuard) {
        let token = self.shutdown.child_token();
        let guard = token.clone().drop_guard();
        (token, guard)
    }
}
