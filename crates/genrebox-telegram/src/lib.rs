// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the genrebox music bot.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide long
//! polling. Commands and audio uploads arrive as events; replies go out as
//! plain messages or as audio re-sent by `file_id`.

pub mod handler;

use async_trait::async_trait;
use genrebox_config::model::TelegramConfig;
use genrebox_core::error::GenreboxError;
use genrebox_core::traits::{ChannelAdapter, PluginAdapter};
use genrebox_core::types::{
    AdapterType, HealthStatus, InboundEvent, MessageId, OutboundMessage, Reply,
};
use teloxide::prelude::*;
use teloxide::types::{ChatId, FileId, InputFile, Recipient, ReplyParameters};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Events buffered between the Telegram dispatcher and the bot loop.
const INBOUND_BUFFER: usize = 100;

/// Telegram channel adapter implementing [`ChannelAdapter`].
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
    /// The bot's `@username`, learned from `getMe` on connect.
    username: Option<String>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: TelegramConfig) -> Result<Self, GenreboxError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            GenreboxError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;

        if token.trim().is_empty() {
            return Err(GenreboxError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
            username: None,
        })
    }

    /// The bot's own username, once [`connect`](ChannelAdapter::connect)
    /// has looked it up.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, GenreboxError> {
        // Check if the bot token is valid by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), GenreboxError> {
        debug!("Telegram channel shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), GenreboxError> {
        if self.polling_handle.is_some() {
            return Ok(()); // Already connected
        }

        match self.bot.get_me().await {
            Ok(me) => {
                info!(username = ?me.user.username, "telegram bot identified");
                self.username = me.user.username.clone();
            }
            Err(e) => warn!(error = %e, "getMe failed, group mentions will not be filtered"),
        }

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |msg: Message| {
                let tx = tx.clone();
                async move {
                    let Some(payload) = handler::extract_payload(&msg) else {
                        debug!(msg_id = msg.id.0, "ignoring unsupported message type");
                        return respond(());
                    };

                    let Some(event) = handler::to_inbound_event(&msg, payload) else {
                        debug!(chat_id = msg.chat.id.0, "ignoring message without sender");
                        return respond(());
                    };

                    if tx.send(event).await.is_err() {
                        warn!("inbound channel closed, dropping message");
                    }
                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {}) // Silently ignore non-message updates
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, GenreboxError> {
        let chat_id = parse_chat_id(&msg.chat_id)?;
        let reply_to = msg.reply_to.as_deref().and_then(parse_message_id);

        let sent = match msg.reply {
            Reply::Text(text) => {
                let mut request = self.bot.send_message(Recipient::Id(chat_id), text);
                if let Some(id) = reply_to {
                    request = request.reply_parameters(ReplyParameters::new(id));
                }
                request.await
            }
            Reply::Audio(track) => {
                let mut request = self
                    .bot
                    .send_audio(Recipient::Id(chat_id), InputFile::file_id(FileId(track.0)));
                if let Some(id) = reply_to {
                    request = request.reply_parameters(ReplyParameters::new(id));
                }
                request.await
            }
        }
        .map_err(|e| GenreboxError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<InboundEvent, GenreboxError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| GenreboxError::ChannelClosed("telegram".into()))
    }
}

/// Parses the numeric Telegram chat id carried by an outbound message.
fn parse_chat_id(chat_id: &str) -> Result<ChatId, GenreboxError> {
    chat_id
        .parse::<i64>()
        .map(ChatId)
        .map_err(|e| GenreboxError::Channel {
            message: format!("invalid chat_id `{chat_id}`: {e}"),
            source: None,
        })
}

/// Parses a message id to reply to. Unparseable ids send without threading.
fn parse_message_id(id: &str) -> Option<teloxide::types::MessageId> {
    id.parse::<i32>().ok().map(teloxide::types::MessageId)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            bot_token: token.map(str::to_string),
        }
    }

    #[test]
    fn new_requires_bot_token() {
        assert!(TelegramChannel::new(config(None)).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        assert!(TelegramChannel::new(config(Some(""))).is_err());
        assert!(TelegramChannel::new(config(Some("   "))).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let channel =
            TelegramChannel::new(config(Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11")));
        assert!(channel.is_ok());
    }

    #[test]
    fn username_is_unknown_before_connect() {
        let channel = TelegramChannel::new(config(Some("test:token"))).unwrap();
        assert_eq!(channel.username(), None);
    }

    #[test]
    fn parse_chat_id_accepts_negative_group_ids() {
        assert_eq!(parse_chat_id("-100123").unwrap(), ChatId(-100123));
        assert_eq!(parse_chat_id("12345").unwrap(), ChatId(12345));
    }

    #[test]
    fn parse_chat_id_rejects_non_numeric() {
        let err = parse_chat_id("telegram").unwrap_err();
        assert!(matches!(err, GenreboxError::Channel { .. }));
    }

    #[test]
    fn parse_message_id_is_lenient() {
        assert_eq!(parse_message_id("42"), Some(teloxide::types::MessageId(42)));
        assert_eq!(parse_message_id("mock-in-1"), None);
    }

    #[test]
    fn plugin_adapter_metadata() {
        let channel = TelegramChannel::new(config(Some("test:token"))).unwrap();
        assert_eq!(channel.name(), "telegram");
        assert_eq!(channel.version(), semver::Version::new(0, 1, 0));
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }
}
