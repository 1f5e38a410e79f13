// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-event dispatch.
//!
//! Each user is either idle or pending on a genre. `/add` moves them to
//! pending, audio uploads are stored under the pending genre, and registry
//! tokens retrieve a random stored track without touching the session.

use std::fmt::Write as _;
use std::sync::Arc;

use genrebox_core::{
    EventPayload, Genre, GenreboxError, InboundEvent, Reply, StorageAdapter, Track, TrackRef,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::command::Command;
use crate::registry::GenreRegistry;
use crate::selector::Selector;
use crate::session::SessionStore;

/// A request the bot understood but declined. `Display` is the reply text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Use: /add techno")]
    UsageError,

    #[error("Unknown command /{0}. Send /start to see the available commands.")]
    UnknownGenreCommand(String),

    #[error("First choose genre with /add genre (for example /add techno)")]
    NoPendingSession,

    #[error("No albums in genre {0}")]
    EmptyGenre(Genre),
}

impl Rejection {
    /// Metric label for this rejection.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::UsageError => "usage",
            Rejection::UnknownGenreCommand(_) => "unknown_command",
            Rejection::NoPendingSession => "no_pending_session",
            Rejection::EmptyGenre(_) => "empty_genre",
        }
    }
}

/// What handling one event produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `/start` help text.
    Help(String),
    /// `/add` accepted; the user is now pending on this genre.
    PendingSet(Genre),
    /// An upload was appended to the catalog.
    Stored(Track),
    /// A random track was chosen for a retrieval command.
    Selected(TrackRef),
    Rejected(Rejection),
    /// Not addressed to the bot; no reply.
    Ignored,
}

impl Outcome {
    /// The reply to send back, if any. Every outcome but `Ignored` has one.
    pub fn into_reply(self) -> Option<Reply> {
        match self {
            Outcome::Help(text) => Some(Reply::Text(text)),
            Outcome::PendingSet(genre) => Some(Reply::Text(format!(
                "Ok. Send me an audio and I'll place it into genre: {genre}"
            ))),
            Outcome::Stored(track) => Some(Reply::Text(format!("Added to {} 🔥", track.genre))),
            Outcome::Selected(reference) => Some(Reply::Audio(reference)),
            Outcome::Rejected(rejection) => Some(Reply::Text(rejection.to_string())),
            Outcome::Ignored => None,
        }
    }
}

/// Dispatches inbound events against the registry, sessions, and catalog.
pub struct Router {
    registry: Arc<GenreRegistry>,
    sessions: SessionStore,
    catalog: Arc<dyn StorageAdapter>,
    selector: Selector,
    /// The bot's own username, used to skip commands meant for other bots.
    username: Option<String>,
}

impl Router {
    pub fn new(registry: Arc<GenreRegistry>, catalog: Arc<dyn StorageAdapter>) -> Self {
        Self {
            registry,
            sessions: SessionStore::new(),
            selector: Selector::new(Arc::clone(&catalog)),
            catalog,
            username: None,
        }
    }

    /// Sets the bot's own username. Group-chat commands such as
    /// `/techno@otherbot` are then ignored.
    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    pub fn registry(&self) -> &GenreRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handles one event.
    ///
    /// Catalog failures return `Err` and leave the sender's session untouched.
    pub async fn dispatch(&self, event: &InboundEvent) -> Result<Outcome, GenreboxError> {
        let outcome = match &event.payload {
            EventPayload::Audio(reference) => self.store_upload(event, reference).await?,
            EventPayload::Text(text) => match Command::parse(text) {
                Some(command) if !command.is_for(self.username.as_deref()) => {
                    debug!(user = %event.sender, token = command.token.as_str(), "command addressed to another bot");
                    Outcome::Ignored
                }
                Some(command) => self.run_command(event, &command).await?,
                None => Outcome::Ignored,
            },
        };

        if let Outcome::Rejected(rejection) = &outcome {
            metrics::counter!("genrebox_rejections_total", "kind" => rejection.kind())
                .increment(1);
            debug!(user = %event.sender, kind = rejection.kind(), "request rejected");
        }
        Ok(outcome)
    }

    async fn run_command(
        &self,
        event: &InboundEvent,
        command: &Command<'_>,
    ) -> Result<Outcome, GenreboxError> {
        match command.token.as_str() {
            "start" => Ok(Outcome::Help(self.help_text())),
            "add" => Ok(self.set_pending(event, command.args)),
            token => match self.registry.resolve(token) {
                Some(genre) => self.retrieve(event, genre).await,
                None => Ok(Outcome::Rejected(Rejection::UnknownGenreCommand(
                    token.to_string(),
                ))),
            },
        }
    }

    fn set_pending(&self, event: &InboundEvent, args: &str) -> Outcome {
        match Genre::parse(args) {
            Some(genre) => {
                self.sessions.set_pending(&event.sender, genre.clone());
                debug!(user = %event.sender, genre = %genre, "pending genre set");
                Outcome::PendingSet(genre)
            }
            None => Outcome::Rejected(Rejection::UsageError),
        }
    }

    async fn store_upload(
        &self,
        event: &InboundEvent,
        reference: &TrackRef,
    ) -> Result<Outcome, GenreboxError> {
        let Some(genre) = self.sessions.get_pending(&event.sender) else {
            return Ok(Outcome::Rejected(Rejection::NoPendingSession));
        };
        let track = self.catalog.insert_track(&genre, reference).await?;
        metrics::counter!("genrebox_tracks_stored_total").increment(1);
        info!(user = %event.sender, genre = %track.genre, track_id = track.id, "track stored");
        Ok(Outcome::Stored(track))
    }

    async fn retrieve(&self, event: &InboundEvent, genre: &Genre) -> Result<Outcome, GenreboxError> {
        match self.selector.pick(genre).await? {
            Some(reference) => {
                metrics::counter!("genrebox_tracks_served_total").increment(1);
                debug!(user = %event.sender, genre = %genre, "track selected");
                Ok(Outcome::Selected(reference))
            }
            None => Ok(Outcome::Rejected(Rejection::EmptyGenre(genre.clone()))),
        }
    }

    fn help_text(&self) -> String {
        let mut text = String::from("Great. Commands:\n/add genre");
        for token in self.registry.tokens() {
            let _ = write!(text, "\n/{token}");
        }
        text
    }
}
