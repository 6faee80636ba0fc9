// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Project CRUD operations.

use rusqlite::params;
use sitesmith_core::{ProjectStatus, SitesmithError};
use tokio_util::sync::CancellationToken;

use crate::database::{is_foreign_key_violation, Database};
use crate::models::{enum_column, format_ts, now, ts_column, NewProject, Page, Project};

const PROJECT_COLUMNS: &str =
    "id, chat_id, name, description, file_path, status, created_at, updated_at";

fn row_to_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        file_path: row.get(4)?,
        status: enum_column(row, 5)?,
        created_at: ts_column(row, 6)?,
        updated_at: ts_column(row, 7)?,
    })
}

/// Insert a project. Returns `NotFound` when the owning chat is missing.
pub async fn create_project(
    db: &Database,
    cancel: &CancellationToken,
    project: &NewProject,
) -> Result<Project, SitesmithError> {
    let project = project.clone();
    let chat_id = project.chat_id;
    let ts = now();
    let created = db
        .call(cancel, move |conn| {
            let ts_text = format_ts(&ts);
            let inserted = conn.execute(
                "INSERT INTO projects \
                 (chat_id, name, description, file_path, status, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    project.chat_id,
                    project.name,
                    project.description,
                    project.file_path,
                    project.status.to_string(),
                    ts_text,
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_foreign_key_violation(&e) => return Ok(None),
                Err(e) => return Err(e),
            }
            Ok(Some(Project {
                id: conn.last_insert_rowid(),
                chat_id: project.chat_id,
                name: project.name,
                description: project.description,
                file_path: project.file_path,
                status: project.status,
                created_at: ts,
                updated_at: ts,
            }))
        })
        .await?;
    created.ok_or(SitesmithError::NotFound {
        entity: "chat",
        id: chat_id,
    })
}

/// Get a project by ID.
pub async fn get_project(
    db: &Database,
    cancel: &CancellationToken,
    id: i64,
) -> Result<Option<Project>, SitesmithError> {
    db.call(cancel, move |conn| {
        let result = conn.query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
            params![id],
            row_to_project,
        );
        match result {
            Ok(project) => Ok(Some(project)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await
}

/// List a chat's projects, newest first.
pub async fn list_projects_by_chat(
    db: &Database,
    cancel: &CancellationToken,
    chat_id: i64,
    page: Page,
) -> Result<Vec<Project>, SitesmithError> {
    db.call(cancel, move |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE chat_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt.query_map(params![chat_id, page.limit, page.offset], row_to_project)?;
        rows.collect()
    })
    .await
}

/// The most recently created project across all chats.
pub async fn latest_project(
    db: &Database,
    cancel: &CancellationToken,
) -> Result<Option<Project>, SitesmithError> {
    db.call(cancel, move |conn| {
        let result = conn.query_row(
            &format!(
                "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC, id DESC LIMIT 1"
            ),
            [],
            row_to_project,
        );
        match result {
            Ok(project) => Ok(Some(project)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await
}

pub async fn update_project_status(
    db: &Database,
    cancel: &CancellationToken,
    id: i64,
    status: ProjectStatus,
) -> Result<(), SitesmithError> {
    let ts = format_ts(&now());
    let changed = db
        .call(cancel, move |conn| {
            conn.execute(
                "UPDATE projects SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.to_string(), ts, id],
            )
        })
        .await?;
    if changed == 0 {
        return Err(SitesmithError::NotFound {
            entity: "project",
            id,
        });
    }
    Ok(())
}

pub async fn delete_project(
    db: &Database,
    cancel: &CancellationToken,
    id: i64,
) -> Result<(), SitesmithError> {
    let changed = db
        .call(cancel, move |conn| {
            conn.execute("DELETE FROM projects WHERE id = ?1", params![id])
        })
        .await?;
    if changed == 0 {
        return Err(SitesmithError::NotFound {
            entity: "project",
            id,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::chats::{create_chat, delete_chat};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_defaults_to_building() {
        let (db, _dir) = setup_db().await;
        let cancel = CancellationToken::new();
        let chat = create_chat(&db, &cancel, "chat").await.unwrap();

        let project = create_project(&db, &cancel, &NewProject::new(chat.id, "Кофейня", ""))
            .await
            .unwrap();
        assert_eq!(project.status, ProjectStatus::Building);
        assert_eq!(project.file_path, "");

        let fetched = get_project(&db, &cancel, project.id).await.unwrap().unwrap();
        assert_eq!(fetched, project);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn status_updates_persist() {
        let (db, _dir) = setup_db().await;
        let cancel = CancellationToken::new();
        let chat = create_chat(&db, &cancel, "chat").await.unwrap();
        let project = create_project(&db, &cancel, &NewProject::new(chat.id, "p", ""))
            .await
            .unwrap();

        update_project_status(&db, &cancel, project.id, ProjectStatus::Failed)
            .await
            .unwrap();
        let fetched = get_project(&db, &cancel, project.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ProjectStatus::Failed);

        let err = update_project_status(&db, &cancel, 999, ProjectStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, SitesmithError::NotFound { entity: "project", .. }));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn listing_and_latest_are_newest_first() {
        let (db, _dir) = setup_db().await;
        let cancel = CancellationToken::new();
        let chat = create_chat(&db, &cancel, "chat").await.unwrap();
        let other = create_chat(&db, &cancel, "other").await.unwrap();

        let a = create_project(&db, &cancel, &NewProject::new(chat.id, "a", ""))
            .await
            .unwrap();
        let b = create_project(&db, &cancel, &NewProject::new(chat.id, "b", ""))
            .await
            .unwrap();
        let c = create_project(&db, &cancel, &NewProject::new(other.id, "c", ""))
            .await
            .unwrap();

        let listed = list_projects_by_chat(&db, &cancel, chat.id, Page::default())
            .await
            .unwrap();
        let ids: Vec<i64> = listed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);

        let latest = latest_project(&db, &cancel).await.unwrap().unwrap();
        assert_eq!(latest.id, c.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_chat_and_cascade() {
        let (db, _dir) = setup_db().await;
        let cancel = CancellationToken::new();

        let err = create_project(&db, &cancel, &NewProject::new(5, "p", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, SitesmithError::NotFound { entity: "chat", id: 5 }));

        let chat = create_chat(&db, &cancel, "chat").await.unwrap();
        let project = create_project(&db, &cancel, &NewProject::new(chat.id, "p", ""))
            .await
            .unwrap();
        delete_chat(&db, &cancel, chat.id).await.unwrap();
        assert!(get_project(&db, &cancel, project.id).await.unwrap().is_none());
        assert!(latest_project(&db, &cancel).await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_project_removes_row() {
        let (db, _dir) = setup_db().await;
        let cancel = CancellationToken::new();
        let chat = create_chat(&db, &cancel, "chat").await.unwrap();
        let project = create_project(&db, &cancel, &NewProject::new(chat.id, "p", ""))
            .await
            .unwrap();

        delete_project(&db, &cancel, project.id).await.unwrap();
        assert!(delete_project(&db, &cancel, project.id).await.unwrap_err().is_not_found());

        db.close().await.unwrap();
    }
}
