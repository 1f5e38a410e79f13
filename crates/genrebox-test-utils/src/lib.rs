// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for genrebox integration tests.
//!
//! Provides a mock channel and a test harness for fast, deterministic,
//! CI-runnable tests without Telegram.
//!
//! # Components
//!
//! - [`MockChannel`] - Mock messaging channel with event injection and reply capture
//! - [`TestHarness`] - Temp SQLite catalog plus the full router stack

pub mod harness;
pub mod mock_channel;

pub use harness::TestHarness;
pub use mock_channel::MockChannel;
