// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for genrebox.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types shared by the catalog, router, and channel crates. Channel
//! and storage adapters implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::GenreboxError;
pub use types::{
    AdapterType, EventPayload, Genre, HealthStatus, InboundEvent, MessageId, OutboundMessage,
    Reply, Track, TrackRef, UserId,
};

pub use traits::{ChannelAdapter, PluginAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genrebox_error_has_all_variants() {
        let _config = GenreboxError::Config("test".into());
        let _storage = GenreboxError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = GenreboxError::Channel {
            message: "test".into(),
            source: None,
        };
        let _internal = GenreboxError::Internal("test".into());
    }

    #[test]
    fn adapter_type_display_round_trips() {
        use std::str::FromStr;

        for variant in [AdapterType::Channel, AdapterType::Storage] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
    }
}
