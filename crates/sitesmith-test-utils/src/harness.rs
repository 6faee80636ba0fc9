// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-dir backed storage for integration tests.
//!
//! `TestHarness` owns a temporary directory holding a fresh SQLite database
//! and a `result/` artifact directory. Both disappear when it is dropped.

use std::path::{Path, PathBuf};

use sitesmith_core::SitesmithError;
use sitesmith_storage::{ArtifactStore, Database};

pub struct TestHarness {
    db: Database,
    artifacts: ArtifactStore,
    db_path: PathBuf,
    temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Opens a migrated database and an artifact store in a new temp dir.
    pub async fn new() -> Result<Self, SitesmithError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| SitesmithError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");
        let db = Database::open(&db_path.to_string_lossy()).await?;
        let artifacts = ArtifactStore::new(db.clone(), temp_dir.path().join("result"))?;
        Ok(Self {
            db,
            artifacts,
            db_path,
            temp_dir,
        })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn result_dir(&self) -> &Path {
        self.artifacts.dir()
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitesmith_storage::queries::chats;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn harness_opens_isolated_storage() {
        let harness = TestHarness::new().await.unwrap();
        assert!(harness.db_path().exists());
        assert!(harness.result_dir().starts_with(harness.root()));

        let chat = chats::create_chat(harness.db(), &CancellationToken::new(), "t")
            .await
            .unwrap();
        assert!(chat.id > 0);
    }
}
