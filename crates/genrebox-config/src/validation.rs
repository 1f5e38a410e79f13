// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as command token syntax, reserved commands, and non-empty paths.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::GenreboxConfig;

/// Command words handled by the router itself; genre tokens may not shadow them.
pub const RESERVED_TOKENS: &[&str] = &["add", "start"];

/// Longest command Telegram accepts.
pub const MAX_TOKEN_LEN: usize = 32;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &GenreboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.bot.user_queue_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "bot.user_queue_capacity must be at least 1".to_string(),
        });
    }

    if config.bot.worker_idle_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "bot.worker_idle_secs must be at least 1".to_string(),
        });
    }

    if let Some(token) = &config.telegram.bot_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "telegram.bot_token must not be empty when set".to_string(),
        });
    }

    let mut seen_tokens = HashSet::new();
    for (i, entry) in config.genres.iter().enumerate() {
        let token = entry.token.trim().to_lowercase();

        if let Some(message) = token_problem(&token) {
            errors.push(ConfigError::Validation {
                message: format!("genres[{i}].token `{}` {message}", entry.token),
            });
        }

        if RESERVED_TOKENS.contains(&token.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("genres[{i}].token `{token}` is reserved for a built-in command"),
            });
        }

        if !token.is_empty() && !seen_tokens.insert(token.clone()) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate genre token `{token}` in [[genres]] array"),
            });
        }

        if entry.genre.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("genres[{i}].genre must not be empty"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Describes what is wrong with a lowercased command token, if anything.
pub fn token_problem(token: &str) -> Option<&'static str> {
    if token.is_empty() {
        return Some("must not be empty");
    }
    if token.len() > MAX_TOKEN_LEN {
        return Some("must be at most 32 characters");
    }
    if !token
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Some("may only contain letters, digits, and underscores");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GenreCommandConfig;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = GenreboxConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = GenreboxConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn zero_worker_idle_fails_validation() {
        let mut config = GenreboxConfig::default();
        config.bot.worker_idle_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "worker_idle_secs"));
    }

    #[test]
    fn blank_bot_token_fails_validation() {
        let mut config = GenreboxConfig::default();
        config.telegram.bot_token = Some("  ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "bot_token"));
    }

    #[test]
    fn reserved_token_fails_validation() {
        let mut config = GenreboxConfig::default();
        config.genres.push(GenreCommandConfig::new("Add", "add"));
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "reserved"));
    }

    #[test]
    fn duplicate_tokens_fail_case_insensitively() {
        let mut config = GenreboxConfig::default();
        config.genres.push(GenreCommandConfig::new("TECHNO", "hard techno"));
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "duplicate genre token `techno`"));
    }

    #[test]
    fn token_with_space_fails_validation() {
        let mut config = GenreboxConfig::default();
        config.genres = vec![GenreCommandConfig::new("dark jungle", "dark jungle")];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "letters, digits, and underscores"));
    }

    #[test]
    fn empty_genre_fails_validation() {
        let mut config = GenreboxConfig::default();
        config.genres = vec![GenreCommandConfig::new("void", "   ")];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "genres[0].genre"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = GenreboxConfig::default();
        config.storage.database_path = " ".to_string();
        config.bot.user_queue_capacity = 0;
        config.bot.worker_idle_secs = 0;
        config.genres = vec![GenreCommandConfig::new("start", "")];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn token_problem_accepts_telegram_command_syntax() {
        assert_eq!(token_problem("drum_and_bass2"), None);
        assert!(token_problem(&"x".repeat(33)).is_some());
        assert!(token_problem("").is_some());
    }
}
