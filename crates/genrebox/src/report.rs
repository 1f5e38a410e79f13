// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `genrebox genres` and `genrebox stats` command implementations.

use std::fmt::Write as _;

use genrebox_config::model::GenreboxConfig;
use genrebox_core::{Genre, GenreboxError, StorageAdapter};
use genrebox_router::GenreRegistry;
use genrebox_storage::SqliteStorage;

/// Run the `genrebox genres` command.
pub fn run_genres(config: &GenreboxConfig) -> Result<(), GenreboxError> {
    let registry = GenreRegistry::new(&config.genres)?;
    print!("{}", format_registry(&registry));
    Ok(())
}

/// Run the `genrebox stats` command against the configured database.
pub async fn run_stats(config: &GenreboxConfig) -> Result<(), GenreboxError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let counts = storage.genre_counts().await;
    storage.close().await?;
    print!("{}", format_counts(&counts?));
    Ok(())
}

fn format_registry(registry: &GenreRegistry) -> String {
    let width = registry.tokens().map(str::len).max().unwrap_or(0) + 1;
    let mut out = String::new();
    for (token, genre) in registry.iter() {
        let _ = writeln!(out, "{:<width$}  {genre}", format!("/{token}"));
    }
    out
}

fn format_counts(counts: &[(Genre, u64)]) -> String {
    if counts.is_empty() {
        return "No tracks stored yet.\n".to_string();
    }
    let width = counts
        .iter()
        .map(|(genre, _)| genre.as_str().len())
        .max()
        .unwrap_or(0);
    let total: u64 = counts.iter().map(|(_, n)| n).sum();

    let mut out = String::new();
    for (genre, n) in counts {
        let _ = writeln!(out, "{:<width$}  {n:>6}", genre.as_str());
    }
    let _ = writeln!(out, "{:<width$}  {total:>6}", "total");
    out
}
