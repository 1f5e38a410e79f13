// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for genrebox.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level genrebox configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenreboxConfig {
    /// Bot identity, logging, and event loop settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Track catalog storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Retrieval commands: each entry maps `/token` to a canonical genre.
    #[serde(default = "default_genres")]
    pub genres: Vec<GenreCommandConfig>,
}

impl Default for GenreboxConfig {
    fn default() -> Self {
        Self {
            bot: BotConfig::default(),
            telegram: TelegramConfig::default(),
            storage: StorageConfig::default(),
            genres: default_genres(),
        }
    }
}

/// Bot identity and event loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name used in logs.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Events queued per user before further events spill into that user's
    /// backlog. The receive loop never waits on a single user.
    #[serde(default = "default_user_queue_capacity")]
    pub user_queue_capacity: usize,

    /// Seconds to wait for in-flight events on shutdown.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,

    /// Seconds a user's worker waits for a new event before exiting.
    #[serde(default = "default_worker_idle_secs")]
    pub worker_idle_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
            user_queue_capacity: default_user_queue_capacity(),
            drain_timeout_secs: default_drain_timeout_secs(),
            worker_idle_secs: default_worker_idle_secs(),
        }
    }
}

fn default_bot_name() -> String {
    "genrebox".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_user_queue_capacity() -> usize {
    32
}

fn default_drain_timeout_secs() -> u64 {
    10
}

fn default_worker_idle_secs() -> u64 {
    300
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `genrebox serve`.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("genrebox").join("music.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("music.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// One retrieval command of the genre registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenreCommandConfig {
    /// Command word without the leading slash, e.g. `darkjungle`.
    pub token: String,

    /// Canonical genre the command resolves to, e.g. `dark jungle`.
    pub genre: String,
}

impl GenreCommandConfig {
    pub fn new(token: &str, genre: &str) -> Self {
        Self {
            token: token.to_string(),
            genre: genre.to_string(),
        }
    }
}

/// The retrieval commands shipped by default.
pub fn default_genres() -> Vec<GenreCommandConfig> {
    vec![
        GenreCommandConfig::new("techno", "techno"),
        GenreCommandConfig::new("house", "house"),
        GenreCommandConfig::new("ambient", "ambient"),
        GenreCommandConfig::new("idm", "idm"),
        GenreCommandConfig::new("ebm", "ebm"),
        GenreCommandConfig::new("dark", "dark"),
        GenreCommandConfig::new("darkjungle", "dark jungle"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_genres_include_multi_word_tag() {
        let genres = default_genres();
        assert!(genres.contains(&GenreCommandConfig::new("darkjungle", "dark jungle")));
        assert_eq!(genres[0].token, "techno");
    }

    #[test]
    fn genres_table_replaces_defaults() {
        let toml_str = r#"
[[genres]]
token = "dnb"
genre = "Drum and Bass"
"#;
        let config: GenreboxConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.genres, vec![GenreCommandConfig::new("dnb", "Drum and Bass")]);
    }

    #[test]
    fn missing_genres_table_uses_defaults() {
        let config: GenreboxConfig = toml::from_str("[bot]\nname = \"x\"\n").unwrap();
        assert_eq!(config.genres, default_genres());
    }

    #[test]
    fn genre_entry_denies_unknown_fields() {
        let toml_str = r#"
[[genres]]
token = "dnb"
genre = "dnb"
alias = "jungle"
"#;
        assert!(toml::from_str::<GenreboxConfig>(toml_str).is_err());
    }
}
