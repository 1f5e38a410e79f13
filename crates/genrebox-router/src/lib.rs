// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command dispatch for the genrebox music bot.
//!
//! This crate provides:
//! - [`GenreRegistry`]: the fixed mapping from retrieval commands to genres
//! - [`SessionStore`]: each user's pending upload genre
//! - [`Selector`]: uniform random choice of a stored track
//! - [`Router`]: the per-event state machine tying them to the track catalog
//!
//! The router is transport-agnostic: it consumes [`genrebox_core::InboundEvent`]s
//! and produces [`Outcome`]s, which the event loop turns into replies.

pub mod command;
pub mod registry;
pub mod router;
pub mod selector;
pub mod session;

pub use command::Command;
pub use registry::GenreRegistry;
pub use router::{Outcome, Rejection, Router};
pub use selector::Selector;
pub use session::SessionStore;
