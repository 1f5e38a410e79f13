// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete bot stack around a temp SQLite
//! catalog and a [`MockChannel`]. Events can be dispatched straight through
//! the router, or pushed through the real [`BotLoop`] with [`TestHarness::run_loop`].

use std::sync::Arc;

use genrebox_agent::BotLoop;
use genrebox_config::model::{BotConfig, GenreCommandConfig, StorageConfig, default_genres};
use genrebox_core::types::{EventPayload, Reply, TrackRef};
use genrebox_core::{GenreboxError, StorageAdapter};
use genrebox_router::{GenreRegistry, Outcome, Router};
use genrebox_storage::SqliteStorage;
use tokio_util::sync::CancellationToken;

use crate::mock_channel::MockChannel;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    genres: Vec<GenreCommandConfig>,
    bot: BotConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            genres: default_genres(),
            bot: BotConfig::default(),
        }
    }

    /// Replace the default retrieval commands.
    pub fn with_genres(mut self, genres: Vec<GenreCommandConfig>) -> Self {
        self.genres = genres;
        self
    }

    /// Set the per-user queue capacity used by [`TestHarness::run_loop`].
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.bot.user_queue_capacity = capacity;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, GenreboxError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| GenreboxError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        }));
        storage.initialize().await?;

        let registry = Arc::new(GenreRegistry::new(&self.genres)?);
        let router = Arc::new(Router::new(registry, storage.clone()));

        Ok(TestHarness {
            mock_channel: Arc::new(MockChannel::new()),
            storage,
            router,
            bot: self.bot,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock channel and temp storage.
pub struct TestHarness {
    /// The mock channel adapter.
    pub mock_channel: Arc<MockChannel>,
    /// SQLite catalog (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    /// Router over the configured registry and the temp catalog.
    pub router: Arc<Router>,
    bot: BotConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Dispatch an event from `user` directly through the router.
    pub async fn dispatch(
        &self,
        user: &str,
        payload: EventPayload,
    ) -> Result<Outcome, GenreboxError> {
        self.router.dispatch(&MockChannel::event(user, payload)).await
    }

    /// Dispatch a text message and return the reply the user would see.
    pub async fn send_text(&self, user: &str, text: &str) -> Result<Option<Reply>, GenreboxError> {
        let outcome = self
            .dispatch(user, EventPayload::Text(text.to_string()))
            .await?;
        Ok(outcome.into_reply())
    }

    /// Dispatch an audio upload and return the reply the user would see.
    pub async fn send_audio(
        &self,
        user: &str,
        file_id: &str,
    ) -> Result<Option<Reply>, GenreboxError> {
        let outcome = self
            .dispatch(user, EventPayload::Audio(TrackRef(file_id.to_string())))
            .await?;
        Ok(outcome.into_reply())
    }

    /// Queue events on the mock channel, close it, and run a [`BotLoop`]
    /// until every event is handled. Returns everything the bot sent.
    pub async fn run_loop(
        &self,
        events: Vec<(&str, EventPayload)>,
    ) -> Result<Vec<genrebox_core::OutboundMessage>, GenreboxError> {
        for (user, payload) in events {
            self.mock_channel
                .inject_event(MockChannel::event(user, payload))
                .await;
        }
        self.mock_channel.close().await;

        let bot = BotLoop::new(
            self.mock_channel.clone(),
            self.router.clone(),
            self.storage.clone(),
            self.bot.clone(),
        );
        bot.run(CancellationToken::new()).await?;
        Ok(self.mock_channel.sent_messages().await)
    }

    /// All references stored under `genre`.
    pub async fn stored(&self, genre: &str) -> Result<Vec<TrackRef>, GenreboxError> {
        let genre = genrebox_core::Genre::parse(genre)
            .ok_or_else(|| GenreboxError::Internal("empty genre".to_string()))?;
        self.storage.tracks_by_genre(&genre).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        let counts = harness.storage.genre_counts().await.unwrap();
        assert!(counts.is_empty());
        assert_eq!(harness.router.registry().len(), 7);
    }

    #[tokio::test]
    async fn with_genres_replaces_registry() {
        let harness = TestHarness::builder()
            .with_genres(vec![GenreCommandConfig::new("dnb", "drum and bass")])
            .build()
            .await
            .unwrap();
        assert_eq!(
            harness.router.registry().resolve("dnb").unwrap().as_str(),
            "drum and bass"
        );
        assert!(harness.router.registry().resolve("techno").is_none());
    }

    #[tokio::test]
    async fn invalid_genres_fail_the_build() {
        let result = TestHarness::builder()
            .with_genres(vec![GenreCommandConfig::new("add", "add")])
            .build()
            .await;
        assert!(matches!(result, Err(GenreboxError::Config(_))));
    }

    #[tokio::test]
    async fn send_helpers_round_trip_through_router() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness.send_text("u", "/add idm").await.unwrap();
        let reply = harness.send_audio("u", "F1").await.unwrap();
        assert_eq!(reply, Some(Reply::Text("Added to idm 🔥".into())));
        assert_eq!(harness.stored("idm").await.unwrap(), vec![TrackRef("F1".into())]);
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::builder().build().await.unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();

        h1.send_text("u", "/add ebm").await.unwrap();
        h1.send_audio("u", "F").await.unwrap();
        assert_eq!(h1.stored("ebm").await.unwrap().len(), 1);
        assert!(h2.stored("ebm").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_loop_replies_to_every_event() {
        let harness = TestHarness::builder().build().await.unwrap();
        let sent = harness
            .run_loop(vec![
                ("u", EventPayload::Text("/start".into())),
                ("u", EventPayload::Text("/add".into())),
            ])
            .await
            .unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].reply, Reply::Text("Use: /add techno".into()));
    }
}
