// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Uniform random track selection.

use std::sync::Arc;

use genrebox_core::{Genre, GenreboxError, StorageAdapter, TrackRef};
use rand::seq::SliceRandom;

/// Picks a random stored track for a genre.
#[derive(Clone)]
pub struct Selector {
    catalog: Arc<dyn StorageAdapter>,
}

impl Selector {
    pub fn new(catalog: Arc<dyn StorageAdapter>) -> Self {
        Self { catalog }
    }

    /// Chooses one element with probability 1/N, or `None` when empty.
    pub fn choose(refs: &[TrackRef]) -> Option<&TrackRef> {
        refs.choose(&mut rand::thread_rng())
    }

    /// Lists the genre's tracks and picks one. `Ok(None)` means the genre is empty.
    pub async fn pick(&self, genre: &Genre) -> Result<Option<TrackRef>, GenreboxError> {
        let refs = self.catalog.tracks_by_genre(genre).await?;
        Ok(Self::choose(&refs).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use genrebox_config::model::StorageConfig;
    use genrebox_storage::SqliteStorage;

    fn refs(names: &[&str]) -> Vec<TrackRef> {
        names.iter().map(|n| TrackRef(n.to_string())).collect()
    }

    #[test]
    fn choose_from_empty_is_none() {
        assert!(Selector::choose(&[]).is_none());
    }

    #[test]
    fn choose_from_single_is_that_element() {
        let one = refs(&["A"]);
        for _ in 0..20 {
            assert_eq!(Selector::choose(&one), Some(&one[0]));
        }
    }

    #[test]
    fn choose_is_roughly_uniform() {
        let pool = refs(&["A", "B", "C", "D"]);
        let mut hits: HashMap<&TrackRef, usize> = HashMap::new();
        for _ in 0..4000 {
            *hits.entry(Selector::choose(&pool).unwrap()).or_default() += 1;
        }
        assert_eq!(hits.len(), 4);
        // Expected 1000 each; the bound is many standard deviations wide.
        for count in hits.values() {
            assert!((700..=1300).contains(count), "skewed count {count}");
        }
    }

    #[tokio::test]
    async fn pick_reads_only_the_requested_genre() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("sel.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        let techno = Genre::parse("techno").unwrap();
        let house = Genre::parse("house").unwrap();
        storage
            .insert_track(&techno, &TrackRef("A".into()))
            .await
            .unwrap();

        let selector = Selector::new(Arc::new(storage));
        assert_eq!(
            selector.pick(&techno).await.unwrap(),
            Some(TrackRef("A".into()))
        );
        assert_eq!(selector.pick(&house).await.unwrap(), None);
    }
}
