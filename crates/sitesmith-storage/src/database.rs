// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements run on tokio-rusqlite's single background thread, so
//! writes are serialized without extra locking. Do NOT open additional
//! connections for writes.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sitesmith_core::{AdapterType, HealthStatus, PluginAdapter, SitesmithError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::migrations;

/// Convert a tokio-rusqlite error into `SitesmithError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> SitesmithError {
    SitesmithError::Storage {
        source: Box::new(e),
    }
}

/// True when `e` is a failed `REFERENCES` check, i.e. the parent row is missing.
pub(crate) fn is_foreign_key_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

/// Handle to the SQLite database. Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (or creates) the database file, applies PRAGMAs and runs
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, SitesmithError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SitesmithError::Storage {
                    source: Box::new(e),
                })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| SitesmithError::Storage {
                source: Box::new(e),
            })?;

        conn.call(|conn| {
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
            conn.pragma_update(None, "foreign_keys", true)?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| Ok(migrations::run_migrations(conn)))
            .await
            .map_err(map_tr_err)??;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Runs `function` on the database thread unless `cancel` fires first.
    ///
    /// A statement already handed to the database thread still completes;
    /// only the caller stops waiting for it.
    pub async fn call<F, R>(&self, cancel: &CancellationToken, function: F) -> Result<R, SitesmithError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, rusqlite::Error> + Send + 'static,
        R: Send + 'static,
    {
        if cancel.is_cancelled() {
            return Err(SitesmithError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SitesmithError::Cancelled),
            result = self.conn.call(function) => result.map_err(map_tr_err),
        }
    }

    /// Checkpoints the WAL and closes the connection.
    pub async fn close(self) -> Result<(), SitesmithError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)?;
        debug!("database closed");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for Database {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, SitesmithError> {
        let result = self
            .conn
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err);
        Ok(match result {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), SitesmithError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
