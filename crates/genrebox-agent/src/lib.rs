// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event loop for the genrebox music bot.
//!
//! The [`BotLoop`] is the central coordinator that:
//! - Receives events from a channel adapter
//! - Hands each event to the sender's worker task, preserving per-user order
//!   without ever waiting on a single user
//! - Sends the router's reply back through the channel
//! - Handles graceful shutdown

pub mod shutdown;
pub mod worker;

use std::sync::Arc;
use std::time::Duration;

use genrebox_config::model::BotConfig;
use genrebox_core::{
    ChannelAdapter, GenreboxError, InboundEvent, OutboundMessage, Reply, StorageAdapter,
};
use genrebox_router::Router;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::worker::WorkerPool;

/// Reply sent when handling an event failed.
pub const FAILURE_REPLY: &str = "Sorry, something went wrong. Please try again.";

/// Coordinates event flow between the channel, the router, and storage.
///
/// Each user gets a worker task (see [`WorkerPool`]), so one user's events
/// are handled strictly in delivery order while different users proceed
/// concurrently. Workers exit after `worker_idle_secs` without events.
pub struct BotLoop {
    channel: Arc<dyn ChannelAdapter>,
    router: Arc<Router>,
    storage: Arc<dyn StorageAdapter>,
    config: BotConfig,
}

impl BotLoop {
    /// Creates a bot loop over an already connected channel.
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        router: Arc<Router>,
        storage: Arc<dyn StorageAdapter>,
        config: BotConfig,
    ) -> Self {
        info!(bot_name = config.name.as_str(), "bot loop initialized");
        Self {
            channel,
            router,
            storage,
            config,
        }
    }

    /// Runs until the cancellation token fires or the channel closes.
    ///
    /// On exit the worker queues are closed, queued events are given
    /// `drain_timeout_secs` to finish, and storage is closed.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), GenreboxError> {
        info!("bot loop running");

        let mut pool = WorkerPool::new(
            Arc::clone(&self.router),
            Arc::clone(&self.channel),
            self.config.user_queue_capacity,
            Duration::from_secs(self.config.worker_idle_secs),
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping bot loop");
                    break;
                }
                Some(finished) = pool.join_next() => pool.reap(finished),
                received = self.channel.receive() => {
                    match received {
                        Ok(event) => pool.dispatch(event),
                        Err(e) if e.is_channel_closed() => {
                            info!("channel closed, stopping bot loop");
                            break;
                        }
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                        }
                    }
                }
            }
        }

        // Closing the queues lets each worker finish what it already holds.
        pool.drain(Duration::from_secs(self.config.drain_timeout_secs))
            .await;

        self.storage.close().await?;

        info!("bot loop stopped");
        Ok(())
    }
}

/// Dispatches one event and sends its reply, if it has one.
///
/// Dispatch failures are logged and answered with [`FAILURE_REPLY`]; send
/// failures are logged.
pub async fn handle_event(router: &Router, channel: &dyn ChannelAdapter, event: InboundEvent) {
    let reply = match router.dispatch(&event).await {
        Ok(outcome) => outcome.into_reply(),
        Err(e) => {
            error!(user = %event.sender, error = %e, "failed to handle event");
            Some(Reply::Text(FAILURE_REPLY.to_string()))
        }
    };

    let Some(reply) = reply else {
        debug!(user = %event.sender, "event ignored");
        return;
    };

    if let Err(e) = channel.send(OutboundMessage::reply_to(&event, reply)).await {
        error!(user = %event.sender, error = %e, "failed to send reply");
    }
}
