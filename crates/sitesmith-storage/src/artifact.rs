// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Artifact store: generated HTML files on disk, indexed by project rows.
//!
//! The file is written first and indexed second. An index failure leaves the
//! file in place. A completed project whose file has vanished is reported
//! (and stored) as failed the next time it is read.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use sitesmith_core::{ProjectStatus, SitesmithError};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::database::Database;
use crate::models::{NewProject, Page, Project};
use crate::queries::projects;

/// Filename layout for artifacts, second precision.
pub const FILENAME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Suffixed names tried for one second before giving up.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// What to record alongside an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDraft {
    pub chat_id: i64,
    pub name: String,
    pub description: String,
}

/// A written and indexed artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedArtifact {
    pub filename: String,
    pub absolute_path: PathBuf,
    pub project: Project,
}

/// Writes artifacts under one directory and indexes them in the database.
#[derive(Clone)]
pub struct ArtifactStore {
    db: Database,
    dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at `dir`, made absolute against the working
    /// directory. The directory itself is created lazily on first write.
    pub fn new(db: Database, dir: impl AsRef<Path>) -> Result<Self, SitesmithError> {
        let dir = std::path::absolute(dir.as_ref()).map_err(|e| SitesmithError::ArtifactWrite {
            path: dir.as_ref().to_path_buf(),
            source: e,
        })?;
        Ok(Self { db, dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The artifact filename for a request made at `requested_at`.
    pub fn filename_for(requested_at: &DateTime<Local>) -> String {
        format!("{}.html", requested_at.format(FILENAME_FORMAT))
    }

    /// Absolute path of `filename` inside the store.
    ///
    /// Rejects anything but a plain `*.html` name with an input error.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, SitesmithError> {
        if !is_plain_html_name(filename) {
            return Err(SitesmithError::Input(format!(
                "invalid artifact filename: {filename}"
            )));
        }
        Ok(self.dir.join(filename))
    }

    /// Writes `html` to a timestamped file and inserts a completed project.
    ///
    /// Files are never overwritten. When another build already took this
    /// second's name, a `-2`, `-3`, ... suffix is appended.
    pub async fn persist(
        &self,
        cancel: &CancellationToken,
        draft: &ArtifactDraft,
        html: &str,
        requested_at: DateTime<Local>,
    ) -> Result<PersistedArtifact, SitesmithError> {
        let (filename, absolute_path) = self.write_new_file(&requested_at, html).await?;

        let new_project = NewProject::new(draft.chat_id, &draft.name, &draft.description)
            .with_file(absolute_path.to_string_lossy())
            .with_status(ProjectStatus::Completed);

        let project = match projects::create_project(&self.db, cancel, &new_project).await {
            Ok(project) => project,
            Err(e) => {
                warn!(
                    filename = %filename,
                    error = %e,
                    "artifact written but not indexed"
                );
                return Err(SitesmithError::ArtifactIndex {
                    path: absolute_path,
                    source: Box::new(e),
                });
            }
        };

        info!(filename = %filename, project_id = project.id, bytes = html.len(), "artifact persisted");
        Ok(PersistedArtifact {
            filename,
            absolute_path,
            project,
        })
    }

    /// Records a project for a build that produced no artifact.
    pub async fn record_failure(
        &self,
        cancel: &CancellationToken,
        draft: &ArtifactDraft,
    ) -> Result<Project, SitesmithError> {
        let new_project = NewProject::new(draft.chat_id, &draft.name, &draft.description)
            .with_status(ProjectStatus::Failed);
        projects::create_project(&self.db, cancel, &new_project).await
    }

    /// Loads a project, downgrading it to failed when its file is gone.
    pub async fn load_project(
        &self,
        cancel: &CancellationToken,
        id: i64,
    ) -> Result<Option<Project>, SitesmithError> {
        match projects::get_project(&self.db, cancel, id).await? {
            Some(project) => self.check_file(cancel, project).await.map(Some),
            None => Ok(None),
        }
    }

    /// The newest project across all chats, with the same file check.
    pub async fn latest(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<Project>, SitesmithError> {
        match projects::latest_project(&self.db, cancel).await? {
            Some(project) => self.check_file(cancel, project).await.map(Some),
            None => Ok(None),
        }
    }

    /// A chat's projects, newest first, each checked for its file.
    pub async fn list_projects(
        &self,
        cancel: &CancellationToken,
        chat_id: i64,
        page: Page,
    ) -> Result<Vec<Project>, SitesmithError> {
        let listed = projects::list_projects_by_chat(&self.db, cancel, chat_id, page).await?;
        let mut checked = Vec::with_capacity(listed.len());
        for project in listed {
            checked.push(self.check_file(cancel, project).await?);
        }
        Ok(checked)
    }

    /// Reads an artifact by filename. `None` when the file does not exist.
    pub async fn read(&self, filename: &str) -> Result<Option<String>, SitesmithError> {
        let path = self.resolve(filename)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SitesmithError::Storage {
                source: Box::new(e),
            }),
        }
    }

    async fn check_file(
        &self,
        cancel: &CancellationToken,
        mut project: Project,
    ) -> Result<Project, SitesmithError> {
        if project.status != ProjectStatus::Completed || project.file_path.is_empty() {
            return Ok(project);
        }
        let exists = tokio::fs::try_exists(&project.file_path)
            .await
            .unwrap_or(false);
        if exists {
            return Ok(project);
        }

        warn!(
            project_id = project.id,
            file_path = %project.file_path,
            "artifact missing, marking project failed"
        );
        projects::update_project_status(&self.db, cancel, project.id, ProjectStatus::Failed)
            .await?;
        project.status = ProjectStatus::Failed;
        Ok(project)
    }

    /// Creates the first free name for `requested_at` and writes `html` to it.
    async fn write_new_file(
        &self,
        requested_at: &DateTime<Local>,
        html: &str,
    ) -> Result<(String, PathBuf), SitesmithError> {
        let write_err = |path: PathBuf, source: io::Error| SitesmithError::ArtifactWrite { path, source };

        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);
        builder
            .create(&self.dir)
            .await
            .map_err(|e| write_err(self.dir.clone(), e))?;

        let stem = requested_at.format(FILENAME_FORMAT).to_string();
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let filename = if attempt == 1 {
                Self::filename_for(requested_at)
            } else {
                format!("{stem}-{attempt}.html")
            };
            let path = self.dir.join(&filename);
            match write_exclusive(&path, html).await {
                Ok(()) => return Ok((filename, path)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(filename = %filename, "artifact name taken, trying next suffix");
                }
                Err(e) => return Err(write_err(path, e)),
            }
        }

        let path = self.dir.join(format!("{stem}.html"));
        Err(write_err(
            path,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{MAX_NAME_ATTEMPTS} artifacts already exist for {stem}"),
            ),
        ))
    }
}

/// Creates `path`, failing with `AlreadyExists` instead of truncating.
async fn write_exclusive(path: &Path, html: &str) -> io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o644);

    let mut file = options.open(path).await?;
    file.write_all(html.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// A bare filename ending in `.html`, with no path components.
pub fn is_plain_html_name(filename: &str) -> bool {
    let Some(stem) = filename.strip_suffix(".html") else {
        return false;
    };
    !stem.is_empty() && !filename.contains(['/', '\\']) && !filename.starts_with('.')
}
