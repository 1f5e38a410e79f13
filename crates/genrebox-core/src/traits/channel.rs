// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for messaging platform integrations.

use async_trait::async_trait;

use crate::error::GenreboxError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundEvent, MessageId, OutboundMessage};

/// Adapter for bidirectional messaging channel integrations.
///
/// The channel is the transport collaborator: it delivers inbound events
/// (commands, text, audio attachments) and sends replies back.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), GenreboxError>;

    /// Sends a text or audio reply through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, GenreboxError>;

    /// Receives the next inbound event, in platform delivery order.
    async fn receive(&self) -> Result<InboundEvent, GenreboxError>;
}
