// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image record CRUD operations.

use rusqlite::params;
use sitesmith_core::SitesmithError;
use tokio_util::sync::CancellationToken;

use crate::database::{is_foreign_key_violation, Database};
use crate::models::{format_ts, now, ts_column, Image, Page};

const IMAGE_COLUMNS: &str = "id, chat_id, prompt, file_path, created_at";

fn row_to_image(row: &rusqlite::Row<'_>) -> rusqlite::Result<Image> {
    Ok(Image {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        prompt: row.get(2)?,
        file_path: row.get(3)?,
        created_at: ts_column(row, 4)?,
    })
}

pub async fn create_image(
    db: &Database,
    cancel: &CancellationToken,
    chat_id: i64,
    prompt: &str,
    file_path: &str,
) -> Result<Image, SitesmithError> {
    let prompt = prompt.to_string();
    let file_path = file_path.to_string();
    let ts = now();
    let created = db
        .call(cancel, move |conn| {
            let inserted = conn.execute(
                "INSERT INTO images (chat_id, prompt, file_path, created_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![chat_id, prompt, file_path, format_ts(&ts)],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_foreign_key_violation(&e) => return Ok(None),
                Err(e) => return Err(e),
            }
            Ok(Some(Image {
                id: conn.last_insert_rowid(),
                chat_id,
                prompt,
                file_path,
                created_at: ts,
            }))
        })
        .await?;
    created.ok_or(SitesmithError::NotFound {
        entity: "chat",
        id: chat_id,
    })
}

pub async fn get_image(
    db: &Database,
    cancel: &CancellationToken,
    id: i64,
) -> Result<Option<Image>, SitesmithError> {
    db.call(cancel, move |conn| {
        let result = conn.query_row(
            &format!("SELECT {IMAGE_COLUMNS} FROM images WHERE id = ?1"),
            params![id],
            row_to_image,
        );
        match result {
            Ok(image) => Ok(Some(image)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await
}

/// List a chat's images, newest first.
pub async fn list_images_by_chat(
    db: &Database,
    cancel: &CancellationToken,
    chat_id: i64,
    page: Page,
) -> Result<Vec<Image>, SitesmithError> {
    db.call(cancel, move |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images WHERE chat_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt.query_map(params![chat_id, page.limit, page.offset], row_to_image)?;
        rows.collect()
    })
    .await
}

pub async fn delete_image(
    db: &Database,
    cancel: &CancellationToken,
    id: i64,
) -> Result<(), SitesmithError> {
    let changed = db
        .call(cancel, move |conn| {
            conn.execute("DELETE FROM images WHERE id = ?1", params![id])
        })
        .await?;
    if changed == 0 {
        return Err(SitesmithError::NotFound { entity: "image", id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::chats::create_chat;
    use tempfile::tempdir;

    #[tokio::test]
    async fn image_records_round_trip() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        let cancel = CancellationToken::new();
        let chat = create_chat(&db, &cancel, "chat").await.unwrap();

        let image = create_image(&db, &cancel, chat.id, "логотип", "/srv/img/logo.png")
            .await
            .unwrap();
        assert_eq!(get_image(&db, &cancel, image.id).await.unwrap(), Some(image.clone()));

        let listed = list_images_by_chat(&db, &cancel, chat.id, Page::default())
            .await
            .unwrap();
        assert_eq!(listed, vec![image.clone()]);

        delete_image(&db, &cancel, image.id).await.unwrap();
        assert!(get_image(&db, &cancel, image.id).await.unwrap().is_none());

        let err = create_image(&db, &cancel, 77, "x", "y").await.unwrap_err();
        assert!(matches!(err, SitesmithError::NotFound { entity: "chat", id: 77 }));

        db.close().await.unwrap();
    }
}
