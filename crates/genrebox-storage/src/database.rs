// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use genrebox_core::GenreboxError;
use tracing::debug;

/// Convert a tokio-rusqlite error into GenreboxError::Storage.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> GenreboxError {
    GenreboxError::Storage {
        source: Box::new(e),
    }
}

fn storage_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> GenreboxError {
    GenreboxError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the catalog database: the single writer for the whole process.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` with WAL enabled.
    pub async fn open(path: &str) -> Result<Self, GenreboxError> {
        Self::open_with(path, true).await
    }

    /// Opens the database, applying pending migrations before the async
    /// connection is handed out.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, GenreboxError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(storage_err)?;
        }

        // Migrations use a short-lived blocking connection; journal mode is
        // persistent, so it is switched here too.
        let migrate_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), GenreboxError> {
            let mut conn = rusqlite::Connection::open(&migrate_path).map_err(storage_err)?;
            if wal_mode {
                let mode: String = conn
                    .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
                    .map_err(storage_err)?;
                debug!(journal_mode = %mode, "journal mode set");
            }
            crate::migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(storage_err)??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(storage_err)?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch(
                "PRAGMA synchronous = FULL;
                 PRAGMA foreign_keys = ON;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying async connection. Every query goes through `call()`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), GenreboxError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
