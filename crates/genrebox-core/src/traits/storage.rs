// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the track catalog.

use async_trait::async_trait;

use crate::error::GenreboxError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Genre, Track, TrackRef};

/// Append-only catalog of genre-tagged track references.
///
/// Rows are never updated or deleted. Every successful insert is durable
/// by the time the call returns.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, pragmas).
    async fn initialize(&self) -> Result<(), GenreboxError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), GenreboxError>;

    /// Appends a track under the given genre and returns the stored row.
    async fn insert_track(
        &self,
        genre: &Genre,
        reference: &TrackRef,
    ) -> Result<Track, GenreboxError>;

    /// Returns every reference stored under the genre. Empty when there are none.
    async fn tracks_by_genre(&self, genre: &Genre) -> Result<Vec<TrackRef>, GenreboxError>;

    /// Returns per-genre track counts, most populous genre first.
    async fn genre_counts(&self) -> Result<Vec<(Genre, u64)>, GenreboxError>;
}
