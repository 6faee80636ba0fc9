// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for the persistence layer and their column codecs.
//!
//! Timestamps are stored as RFC 3339 text with second precision, always UTC.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use serde::Serialize;
use sitesmith_core::{ProjectStatus, Role};

/// A conversation that owns messages, projects and images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chat {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A dialog turn persisted under a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMessage {
    pub id: i64,
    pub chat_id: i64,
    pub role: Role,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// A generated site and the artifact file that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: i64,
    pub chat_id: i64,
    pub name: String,
    pub description: String,
    /// Absolute path of the artifact; empty while nothing was written.
    pub file_path: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub chat_id: i64,
    pub name: String,
    pub description: String,
    pub file_path: String,
    pub status: ProjectStatus,
}

impl NewProject {
    /// A project in `building` state without an artifact.
    pub fn new(chat_id: i64, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            chat_id,
            name: name.into(),
            description: description.into(),
            file_path: String::new(),
            status: ProjectStatus::Building,
        }
    }

    pub fn with_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = file_path.into();
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub id: i64,
    pub chat_id: i64,
    pub prompt: String,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

/// Limit/offset window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.max(0),
            offset: offset.max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

/// Current time truncated to the stored precision.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses stored timestamps. Also accepts SQLite's `CURRENT_TIMESTAMP` form.
pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Ok(ts.with_timezone(&Utc)),
        Err(e) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .map(|naive| naive.and_utc())
            .map_err(|_| e),
    }
}

pub(crate) fn ts_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads a text column through the type's `FromStr`.
pub(crate) fn enum_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_use_second_precision_utc() {
        let ts = parse_ts("2026-03-01T10:20:30Z").unwrap();
        assert_eq!(format_ts(&ts), "2026-03-01T10:20:30Z");
        assert_eq!(now().timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn legacy_sqlite_timestamps_parse() {
        let ts = parse_ts("2025-07-14 08:00:00").unwrap();
        assert_eq!(format_ts(&ts), "2025-07-14T08:00:00Z");
        assert!(parse_ts("yesterday").is_err());
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let ts = parse_ts("2026-03-01T13:20:30+03:00").unwrap();
        assert_eq!(format_ts(&ts), "2026-03-01T10:20:30Z");
    }

    #[test]
    fn page_clamps_negative_values() {
        assert_eq!(Page::new(-1, -5), Page { limit: 0, offset: 0 });
    }
}
