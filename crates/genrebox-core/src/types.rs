// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the router.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Platform-assigned identifier of the user who sent an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a message delivered by a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// A normalized genre tag.
///
/// Always non-empty, lowercase, and free of surrounding whitespace. Inner
/// whitespace is kept, so multi-word genres such as `dark jungle` survive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Genre(String);

impl Genre {
    /// Normalizes free-form text into a genre, or `None` if nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Genre {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Genre::parse(&raw).ok_or_else(|| serde::de::Error::custom("genre must not be empty"))
    }
}

/// Opaque handle to an audio file hosted by the messaging platform.
///
/// Only the handle is stored; the file content never passes through genrebox.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackRef(pub String);

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored catalog row. Immutable once inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Monotonic row id assigned by the catalog.
    pub id: i64,
    pub genre: Genre,
    pub reference: TrackRef,
    /// ISO 8601 insertion timestamp.
    pub created_at: String,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}

// --- Channel types ---

/// What an inbound event carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// Command or plain text.
    Text(String),
    /// An audio attachment, identified by its platform file handle.
    Audio(TrackRef),
}

/// An event received from a channel adapter.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Platform message id, used to thread the reply.
    pub id: String,
    /// Name of the channel that delivered the event.
    pub channel: String,
    pub sender: UserId,
    /// Conversation the reply goes back to.
    pub chat_id: String,
    pub payload: EventPayload,
    /// ISO 8601 timestamp.
    pub timestamp: String,
}

/// Reply content sent back to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Audio(TrackRef),
}

/// A reply addressed to a conversation on a channel.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub channel: String,
    pub chat_id: String,
    /// Message id to reply to, if the channel supports threading.
    pub reply_to: Option<String>,
    pub reply: Reply,
}

impl OutboundMessage {
    /// Builds a reply to the given inbound event.
    pub fn reply_to(event: &InboundEvent, reply: Reply) -> Self {
        Self {
            channel: event.channel.clone(),
            chat_id: event.chat_id.clone(),
            reply_to: Some(event.id.clone()),
            reply,
        }
    }
}
