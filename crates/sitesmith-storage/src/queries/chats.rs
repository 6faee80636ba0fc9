// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat CRUD operations.

use rusqlite::params;
use sitesmith_core::SitesmithError;
use tokio_util::sync::CancellationToken;

use crate::database::Database;
use crate::models::{format_ts, now, ts_column, Chat, Page};

const CHAT_COLUMNS: &str = "id, title, created_at, updated_at";

fn row_to_chat(row: &rusqlite::Row<'_>) -> rusqlite::Result<Chat> {
    Ok(Chat {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: ts_column(row, 2)?,
        updated_at: ts_column(row, 3)?,
    })
}

/// Create a chat with the given title.
pub async fn create_chat(
    db: &Database,
    cancel: &CancellationToken,
    title: &str,
) -> Result<Chat, SitesmithError> {
    let title = title.to_string();
    let ts = now();
    db.call(cancel, move |conn| {
        conn.execute(
            "INSERT INTO chats (title, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![title, format_ts(&ts)],
        )?;
        Ok(Chat {
            id: conn.last_insert_rowid(),
            title,
            created_at: ts,
            updated_at: ts,
        })
    })
    .await
}

/// Get a chat by ID.
pub async fn get_chat(
    db: &Database,
    cancel: &CancellationToken,
    id: i64,
) -> Result<Option<Chat>, SitesmithError> {
    db.call(cancel, move |conn| {
        let result = conn.query_row(
            &format!("SELECT {CHAT_COLUMNS} FROM chats WHERE id = ?1"),
            params![id],
            row_to_chat,
        );
        match result {
            Ok(chat) => Ok(Some(chat)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await
}

/// List chats, most recently updated first.
pub async fn list_chats(
    db: &Database,
    cancel: &CancellationToken,
    page: Page,
) -> Result<Vec<Chat>, SitesmithError> {
    db.call(cancel, move |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats ORDER BY updated_at DESC, id DESC LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt.query_map(params![page.limit, page.offset], row_to_chat)?;
        rows.collect()
    })
    .await
}

/// Rename a chat and bump its `updated_at`.
pub async fn update_chat_title(
    db: &Database,
    cancel: &CancellationToken,
    id: i64,
    title: &str,
) -> Result<(), SitesmithError> {
    let title = title.to_string();
    let ts = format_ts(&now());
    let changed = db
        .call(cancel, move |conn| {
            conn.execute(
                "UPDATE chats SET title = ?1, updated_at = ?2 WHERE id = ?3",
                params![title, ts, id],
            )
        })
        .await?;
    if changed == 0 {
        return Err(SitesmithError::NotFound { entity: "chat", id });
    }
    Ok(())
}

/// Delete a chat together with its messages, projects and images.
pub async fn delete_chat(
    db: &Database,
    cancel: &CancellationToken,
    id: i64,
) -> Result<(), SitesmithError> {
    let changed = db
        .call(cancel, move |conn| {
            conn.execute("DELETE FROM chats WHERE id = ?1", params![id])
        })
        .await?;
    if changed == 0 {
        return Err(SitesmithError::NotFound { entity: "chat", id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let (db, _dir) = setup_db().await;
        let cancel = CancellationToken::new();

        let chat = create_chat(&db, &cancel, "Лендинг кофейни").await.unwrap();
        let fetched = get_chat(&db, &cancel, chat.id).await.unwrap().unwrap();
        assert_eq!(fetched, chat);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_chat_returns_none() {
        let (db, _dir) = setup_db().await;
        let cancel = CancellationToken::new();
        assert!(get_chat(&db, &cancel, 999).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_is_newest_first_and_paginated() {
        let (db, _dir) = setup_db().await;
        let cancel = CancellationToken::new();

        let a = create_chat(&db, &cancel, "a").await.unwrap();
        let b = create_chat(&db, &cancel, "b").await.unwrap();
        let c = create_chat(&db, &cancel, "c").await.unwrap();

        let all = list_chats(&db, &cancel, Page::default()).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);

        let second = list_chats(&db, &cancel, Page::new(1, 1)).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, b.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let (db, _dir) = setup_db().await;
        let cancel = CancellationToken::new();

        let chat = create_chat(&db, &cancel, "old").await.unwrap();
        update_chat_title(&db, &cancel, chat.id, "new").await.unwrap();
        assert_eq!(
            get_chat(&db, &cancel, chat.id).await.unwrap().unwrap().title,
            "new"
        );

        let err = update_chat_title(&db, &cancel, 404, "x").await.unwrap_err();
        assert!(err.is_not_found());

        delete_chat(&db, &cancel, chat.id).await.unwrap();
        let err = delete_chat(&db, &cancel, chat.id).await.unwrap_err();
        assert!(matches!(err, SitesmithError::NotFound { entity: "chat", .. }));

        db.close().await.unwrap();
    }
}
