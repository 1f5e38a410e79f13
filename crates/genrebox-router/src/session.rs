// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user pending genre. Held in memory only; lost on restart.

use dashmap::DashMap;
use genrebox_core::{Genre, UserId};

/// The genre each user most recently chose with `/add`.
///
/// Internally synchronized; operations on one user's slot are linearizable.
#[derive(Debug, Default)]
pub struct SessionStore {
    pending: DashMap<UserId, Genre>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the user's pending genre, replacing any previous one.
    pub fn set_pending(&self, user: &UserId, genre: Genre) {
        self.pending.insert(user.clone(), genre);
    }

    pub fn get_pending(&self, user: &UserId) -> Option<Genre> {
        self.pending.get(user).map(|entry| entry.value().clone())
    }

    /// Number of users with a pending genre.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
