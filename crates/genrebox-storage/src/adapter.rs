// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use genrebox_config::model::StorageConfig;
use genrebox_core::{
    AdapterType, Genre, GenreboxError, HealthStatus, PluginAdapter, StorageAdapter, Track,
    TrackRef,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed track catalog.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules. The
/// database is lazily opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: StorageAdapter::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, GenreboxError> {
        self.db.get().ok_or_else(|| GenreboxError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, GenreboxError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GenreboxError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), GenreboxError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| GenreboxError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), GenreboxError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn insert_track(
        &self,
        genre: &Genre,
        reference: &TrackRef,
    ) -> Result<Track, GenreboxError> {
        queries::tracks::insert_track(self.db()?, genre, reference).await
    }

    async fn tracks_by_genre(&self, genre: &Genre) -> Result<Vec<TrackRef>, GenreboxError> {
        queries::tracks::tracks_by_genre(self.db()?, genre).await
    }

    async fn genre_counts(&self) -> Result<Vec<(Genre, u64)>, GenreboxError> {
        queries::tracks::genre_counts(self.db()?).await
    }
}
