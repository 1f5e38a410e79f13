// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for genrebox.

use thiserror::Error;

/// The primary error type used across adapter traits and core operations.
///
/// User-facing rejections (missing `/add` argument, empty genre, ...) are not
/// errors at this level; the router reports them as outcomes. Anything that
/// reaches a `GenreboxError` is a failed operation.
#[derive(Debug, Error)]
pub enum GenreboxError {
    /// Configuration errors (invalid TOML, bad genre table, missing token).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (connection failure, send failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The named channel will never deliver another event.
    #[error("{0} channel closed")]
    ChannelClosed(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GenreboxError {
    /// Returns true when the error means the channel will never deliver again.
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, GenreboxError::ChannelClosed(_))
    }
}
