// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user daily request counter.
//!
//! One row per `(user_id, request_date)`. Dates are local calendar days
//! stored as `YYYY-MM-DD`.

use chrono::NaiveDate;
use rusqlite::params;
use sitesmith_core::SitesmithError;
use tokio_util::sync::CancellationToken;

use crate::database::Database;
use crate::models::{format_ts, now};

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Number of requests recorded for the user on `date`; 0 when there is none.
pub async fn get_request_count(
    db: &Database,
    cancel: &CancellationToken,
    user_id: &str,
    date: NaiveDate,
) -> Result<u32, SitesmithError> {
    let user_id = user_id.to_string();
    let date = date_key(date);
    db.call(cancel, move |conn| {
        let result = conn.query_row(
            "SELECT request_count FROM user_requests WHERE user_id = ?1 AND request_date = ?2",
            params![user_id, date],
            |row| row.get::<_, u32>(0),
        );
        match result {
            Ok(count) => Ok(count),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(e),
        }
    })
    .await
}

/// Increment the counter for the user on `date`, creating it at 1.
///
/// A single UPSERT statement, so concurrent increments never lose a count.
/// Returns the new value.
pub async fn increment_request_count(
    db: &Database,
    cancel: &CancellationToken,
    user_id: &str,
    date: NaiveDate,
) -> Result<u32, SitesmithError> {
    let user_id = user_id.to_string();
    let date = date_key(date);
    let ts = format_ts(&now());
    db.call(cancel, move |conn| {
        conn.query_row(
            "INSERT INTO user_requests (user_id, request_date, request_count, created_at, updated_at) \
             VALUES (?1, ?2, 1, ?3, ?3) \
             ON CONFLICT(user_id, request_date) DO UPDATE SET \
             request_count = request_count + 1, updated_at = excluded.updated_at \
             RETURNING request_count",
            params![user_id, date, ts],
            |row| row.get::<_, u32>(0),
        )
    })
    .await
}
