// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Track catalog queries. The table is append-only: there is no update or delete.

use genrebox_core::{Genre, GenreboxError, Track, TrackRef};
use rusqlite::params;
use rusqlite::types::Type;

use crate::database::Database;

fn genre_from_column(idx: usize, raw: String) -> Result<Genre, rusqlite::Error> {
    Genre::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, "empty genre".into())
    })
}

/// Append a track and return the committed row.
pub async fn insert_track(
    db: &Database,
    genre: &Genre,
    reference: &TrackRef,
) -> Result<Track, GenreboxError> {
    let genre = genre.clone();
    let reference = reference.clone();
    db.connection()
        .call(move |conn| -> Result<Track, rusqlite::Error> {
            let (id, created_at) = conn.query_row(
                "INSERT INTO tracks (genre, file_id) VALUES (?1, ?2)
                 RETURNING id, created_at",
                params![genre.as_str(), reference.0],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )?;
            Ok(Track {
                id,
                genre,
                reference,
                created_at,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All references stored under a genre, in insertion order.
pub async fn tracks_by_genre(db: &Database, genre: &Genre) -> Result<Vec<TrackRef>, GenreboxError> {
    let genre = genre.as_str().to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<TrackRef>, rusqlite::Error> {
            let mut stmt =
                conn.prepare_cached("SELECT file_id FROM tracks WHERE genre = ?1 ORDER BY id")?;
            let rows = stmt.query_map(params![genre], |row| Ok(TrackRef(row.get(0)?)))?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Track totals per genre, most populous first; ties broken alphabetically.
pub async fn genre_counts(db: &Database) -> Result<Vec<(Genre, u64)>, GenreboxError> {
    db.connection()
        .call(|conn| -> Result<Vec<(Genre, u64)>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT genre, COUNT(*) AS total FROM tracks
                 GROUP BY genre ORDER BY total DESC, genre ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                let genre = genre_from_column(0, row.get(0)?)?;
                let total: i64 = row.get(1)?;
                Ok((genre, total as u64))
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("tracks.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn genre(s: &str) -> Genre {
        Genre::parse(s).unwrap()
    }

    #[tokio::test]
    async fn insert_returns_committed_row() {
        let (db, _dir) = test_db().await;
        let track = insert_track(&db, &genre("techno"), &TrackRef("file-a".into()))
            .await
            .unwrap();
        assert!(track.id > 0);
        assert_eq!(track.genre.as_str(), "techno");
        assert_eq!(track.reference, TrackRef("file-a".into()));
        assert!(track.created_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn ids_are_monotonic() {
        let (db, _dir) = test_db().await;
        let first = insert_track(&db, &genre("house"), &TrackRef("a".into()))
            .await
            .unwrap();
        let second = insert_track(&db, &genre("house"), &TrackRef("b".into()))
            .await
            .unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn duplicates_are_kept() {
        let (db, _dir) = test_db().await;
        for _ in 0..2 {
            insert_track(&db, &genre("ambient"), &TrackRef("same".into()))
                .await
                .unwrap();
        }
        let refs = tracks_by_genre(&db, &genre("ambient")).await.unwrap();
        assert_eq!(refs, vec![TrackRef("same".into()), TrackRef("same".into())]);
    }

    #[tokio::test]
    async fn tracks_by_genre_filters_by_exact_genre() {
        let (db, _dir) = test_db().await;
        insert_track(&db, &genre("dark"), &TrackRef("d1".into()))
            .await
            .unwrap();
        insert_track(&db, &genre("dark jungle"), &TrackRef("dj1".into()))
            .await
            .unwrap();

        let dark = tracks_by_genre(&db, &genre("dark")).await.unwrap();
        assert_eq!(dark, vec![TrackRef("d1".into())]);
        let jungle = tracks_by_genre(&db, &genre("Dark Jungle")).await.unwrap();
        assert_eq!(jungle, vec![TrackRef("dj1".into())]);
    }

    #[tokio::test]
    async fn unknown_genre_is_empty_not_error() {
        let (db, _dir) = test_db().await;
        let refs = tracks_by_genre(&db, &genre("polka")).await.unwrap();
        assert!(refs.is_empty());
    }

    #[tokio::test]
    async fn genre_counts_orders_by_total() {
        let (db, _dir) = test_db().await;
        for (g, f) in [("idm", "1"), ("ebm", "2"), ("ebm", "3"), ("techno", "4")] {
            insert_track(&db, &genre(g), &TrackRef(f.into()))
                .await
                .unwrap();
        }
        let counts = genre_counts(&db).await.unwrap();
        assert_eq!(
            counts,
            vec![(genre("ebm"), 2), (genre("idm"), 1), (genre("techno"), 1)]
        );
    }
}
