// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer and artifact store for Sitesmith.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, typed CRUD operations for chats,
//! messages, projects and images, the per-user daily request counter, and
//! the [`ArtifactStore`] that writes generated sites to disk.

pub mod artifact;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use artifact::{ArtifactDraft, ArtifactStore, PersistedArtifact, is_plain_html_name};
pub use database::Database;
pub use models::*;
