// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.

use rusqlite::params;
use sitesmith_core::{Role, SitesmithError};
use tokio_util::sync::CancellationToken;

use crate::database::{is_foreign_key_violation, Database};
use crate::models::{enum_column, format_ts, now, ts_column, Page, StoredMessage};

const MESSAGE_COLUMNS: &str = "id, chat_id, role, content, sent_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredMessage> {
    Ok(StoredMessage {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        role: enum_column(row, 2)?,
        content: row.get(3)?,
        sent_at: ts_column(row, 4)?,
    })
}

/// Append a message to a chat and bump the chat's `updated_at`.
///
/// Returns `NotFound` when the chat does not exist.
pub async fn create_message(
    db: &Database,
    cancel: &CancellationToken,
    chat_id: i64,
    role: Role,
    content: &str,
) -> Result<StoredMessage, SitesmithError> {
    let content = content.to_string();
    let ts = now();
    let created = db
        .call(cancel, move |conn| {
            let tx = conn.transaction()?;
            let ts_text = format_ts(&ts);
            let inserted = tx.execute(
                "INSERT INTO messages (chat_id, role, content, sent_at) VALUES (?1, ?2, ?3, ?4)",
                params![chat_id, role.to_string(), content, ts_text],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_foreign_key_violation(&e) => return Ok(None),
                Err(e) => return Err(e),
            }
            let id = tx.last_insert_rowid();
            tx.execute(
                "UPDATE chats SET updated_at = ?1 WHERE id = ?2",
                params![ts_text, chat_id],
            )?;
            tx.commit()?;
            Ok(Some(StoredMessage {
                id,
                chat_id,
                role,
                content,
                sent_at: ts,
            }))
        })
        .await?;
    created.ok_or(SitesmithError::NotFound {
        entity: "chat",
        id: chat_id,
    })
}

/// Get a message by ID.
pub async fn get_message(
    db: &Database,
    cancel: &CancellationToken,
    id: i64,
) -> Result<Option<StoredMessage>, SitesmithError> {
    db.call(cancel, move |conn| {
        let result = conn.query_row(
            &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
            params![id],
            row_to_message,
        );
        match result {
            Ok(msg) => Ok(Some(msg)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await
}

/// List a chat's messages in the order they were sent.
pub async fn list_messages(
    db: &Database,
    cancel: &CancellationToken,
    chat_id: i64,
    page: Page,
) -> Result<Vec<StoredMessage>, SitesmithError> {
    db.call(cancel, move |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = ?1 \
             ORDER BY sent_at ASC, id ASC LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt.query_map(params![chat_id, page.limit, page.offset], row_to_message)?;
        rows.collect()
    })
    .await
}

pub async fn delete_message(
    db: &Database,
    cancel: &CancellationToken,
    id: i64,
) -> Result<(), SitesmithError> {
    let changed = db
        .call(cancel, move |conn| {
            conn.execute("DELETE FROM messages WHERE id = ?1", params![id])
        })
        .await?;
    if changed == 0 {
        return Err(SitesmithError::NotFound {
            entity: "message",
            id,
        });
    }
    Ok(())
}
