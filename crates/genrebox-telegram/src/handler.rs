// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of Telegram messages into channel-agnostic [`InboundEvent`]s.
//!
//! Only text (commands included) and audio attachments are carried over;
//! every other message kind is dropped here.

use genrebox_core::types::{EventPayload, InboundEvent, TrackRef, UserId};
use teloxide::types::Message;

/// Extracts the part of a message the bot acts on.
///
/// Returns `None` for unsupported message types (stickers, photos, voice, ...).
pub fn extract_payload(msg: &Message) -> Option<EventPayload> {
    if let Some(text) = msg.text() {
        return Some(EventPayload::Text(text.to_string()));
    }

    if let Some(audio) = msg.audio() {
        return Some(EventPayload::Audio(TrackRef(audio.file.id.0.clone())));
    }

    None
}

/// Converts a Telegram message and its payload into an [`InboundEvent`].
///
/// Messages without a sender (e.g., channel posts) yield `None`: pending
/// genres are keyed by user.
pub fn to_inbound_event(msg: &Message, payload: EventPayload) -> Option<InboundEvent> {
    let user = msg.from.as_ref()?;

    Some(InboundEvent {
        id: msg.id.0.to_string(),
        channel: "telegram".to_string(),
        sender: UserId(user.id.0.to_string()),
        chat_id: msg.chat.id.0.to_string(),
        payload,
        timestamp: msg.date.to_rfc3339(),
    })
}
