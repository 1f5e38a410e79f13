// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user worker tasks.
//!
//! Each user with recent activity owns one worker task. Events reach it
//! through a bounded `mpsc` queue; when that queue is full they spill into
//! an unbounded backlog instead, so handing off an event never waits and a
//! slow user cannot stall the receive loop. A worker that sees no event for
//! the idle timeout closes its queue and exits, and the pool forgets it.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use genrebox_core::{ChannelAdapter, InboundEvent, UserId};
use genrebox_router::Router;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, warn};

use crate::handle_event;

type Backlog = Arc<Mutex<VecDeque<InboundEvent>>>;

fn lock(backlog: &Backlog) -> MutexGuard<'_, VecDeque<InboundEvent>> {
    backlog.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sending half of one user's queue.
///
/// Every event still in the `mpsc` queue is older than every event in the
/// backlog. Both sides only move events while holding the backlog lock.
struct UserQueue {
    tx: mpsc::Sender<InboundEvent>,
    backlog: Backlog,
}

impl UserQueue {
    /// Hands an event to the worker. Gives the event back if the worker is gone.
    fn push(&self, event: InboundEvent) -> Result<(), InboundEvent> {
        let mut backlog = lock(&self.backlog);
        if !backlog.is_empty() {
            if self.tx.is_closed() {
                return Err(event);
            }
            backlog.push_back(event);
            return Ok(());
        }
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(event)) => {
                warn!(user = %event.sender, "worker queue full, buffering event");
                metrics::counter!("genrebox_queue_overflow_total").increment(1);
                backlog.push_back(event);
                Ok(())
            }
            Err(TrySendError::Closed(event)) => Err(event),
        }
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half of one user's queue.
struct Inbox {
    rx: mpsc::Receiver<InboundEvent>,
    backlog: Backlog,
}

impl Inbox {
    fn try_next(&mut self) -> Option<InboundEvent> {
        let mut backlog = lock(&self.backlog);
        self.rx.try_recv().ok().or_else(|| backlog.pop_front())
    }

    /// Next event in delivery order, or `None` once the pool dropped the
    /// queue and everything was handled, or after `idle` without events.
    async fn next(&mut self, idle: Duration) -> Option<InboundEvent> {
        if let Some(event) = self.try_next() {
            return Some(event);
        }
        match tokio::time::timeout(idle, self.rx.recv()).await {
            Ok(Some(event)) => Some(event),
            Ok(None) => lock(&self.backlog).pop_front(),
            Err(_elapsed) => {
                let mut backlog = lock(&self.backlog);
                let event = self.rx.try_recv().ok().or_else(|| backlog.pop_front());
                if event.is_none() {
                    // Closed under the lock, so later pushes fail and respawn.
                    self.rx.close();
                }
                event
            }
        }
    }
}

/// The set of live per-user workers.
pub struct WorkerPool {
    router: Arc<Router>,
    channel: Arc<dyn ChannelAdapter>,
    capacity: usize,
    idle: Duration,
    queues: HashMap<UserId, UserQueue>,
    tasks: JoinSet<UserId>,
}

impl WorkerPool {
    /// Creates an empty pool. `capacity` is clamped to at least 1.
    pub fn new(
        router: Arc<Router>,
        channel: Arc<dyn ChannelAdapter>,
        capacity: usize,
        idle: Duration,
    ) -> Self {
        Self {
            router,
            channel,
            capacity: capacity.max(1),
            idle,
            queues: HashMap::new(),
            tasks: JoinSet::new(),
        }
    }

    /// Number of users that currently have a worker.
    pub fn active(&self) -> usize {
        self.queues.len()
    }

    /// Hands the event to its sender's worker, starting one if needed.
    /// Never waits.
    pub fn dispatch(&mut self, event: InboundEvent) {
        let event = match self.queues.get(&event.sender) {
            Some(queue) => match queue.push(event) {
                Ok(()) => return,
                Err(returned) => {
                    debug!(user = %returned.sender, "worker exited, starting a new one");
                    returned
                }
            },
            None => event,
        };

        let user = event.sender.clone();
        let queue = self.spawn(&user);
        if queue.push(event).is_err() {
            error!(user = %user, "new worker dropped its queue");
        }
        self.queues.insert(user, queue);
        metrics::gauge!("genrebox_active_workers").set(self.queues.len() as f64);
    }

    /// Waits for the next worker to exit. `None` when no worker is running.
    pub async fn join_next(&mut self) -> Option<Result<UserId, JoinError>> {
        self.tasks.join_next().await
    }

    /// Forgets the workers that have exited.
    pub fn reap(&mut self, finished: Result<UserId, JoinError>) {
        match finished {
            Ok(user) => debug!(user = %user, "worker exited"),
            Err(e) => error!(error = %e, "worker task failed"),
        }
        // A replacement worker for the same user has an open queue and stays.
        self.queues.retain(|_, queue| !queue.is_closed());
        metrics::gauge!("genrebox_active_workers").set(self.queues.len() as f64);
    }

    /// Closes every queue and waits up to `timeout` for the workers to
    /// handle what they already hold.
    pub async fn drain(mut self, timeout: Duration) {
        self.queues.clear();
        crate::shutdown::drain_workers(&mut self.tasks, timeout).await;
        metrics::gauge!("genrebox_active_workers").set(0.0);
    }

    fn spawn(&mut self, user: &UserId) -> UserQueue {
        let (tx, rx) = mpsc::channel(self.capacity);
        let backlog = Backlog::default();
        let mut inbox = Inbox {
            rx,
            backlog: Arc::clone(&backlog),
        };
        let router = Arc::clone(&self.router);
        let channel = Arc::clone(&self.channel);
        let idle = self.idle;
        let user = user.clone();

        self.tasks.spawn(async move {
            debug!(user = %user, "worker started");
            while let Some(event) = inbox.next(idle).await {
                handle_event(&router, channel.as_ref(), event).await;
            }
            debug!(user = %user, "worker finished");
            user
        });

        UserQueue { tx, backlog }
    }
}
