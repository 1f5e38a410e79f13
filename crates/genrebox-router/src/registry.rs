// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval command table.
//!
//! Maps command tokens such as `darkjungle` to canonical genres such as
//! `dark jungle`. Built once at startup from `[[genres]]` and read-only after.

use std::collections::HashMap;

use genrebox_config::GenreCommandConfig;
use genrebox_config::validation::{RESERVED_TOKENS, token_problem};
use genrebox_core::{Genre, GenreboxError};

/// Read-only mapping from command token to canonical genre.
#[derive(Debug, Clone)]
pub struct GenreRegistry {
    /// Tokens in configuration order, for help output.
    order: Vec<String>,
    by_token: HashMap<String, Genre>,
}

impl GenreRegistry {
    /// Builds the registry from configured `(token, genre)` entries.
    ///
    /// Tokens are lowercased. Fails on malformed, reserved, or duplicate
    /// tokens and on genres that normalize to nothing.
    pub fn new(entries: &[GenreCommandConfig]) -> Result<Self, GenreboxError> {
        let mut order = Vec::with_capacity(entries.len());
        let mut by_token = HashMap::with_capacity(entries.len());

        for entry in entries {
            let token = entry.token.trim().to_lowercase();
            if let Some(problem) = token_problem(&token) {
                return Err(GenreboxError::Config(format!(
                    "genre command `{}` {problem}",
                    entry.token
                )));
            }
            if RESERVED_TOKENS.contains(&token.as_str()) {
                return Err(GenreboxError::Config(format!(
                    "genre command `{token}` is reserved"
                )));
            }
            let genre = Genre::parse(&entry.genre).ok_or_else(|| {
                GenreboxError::Config(format!("genre command `{token}` has an empty genre"))
            })?;
            if by_token.insert(token.clone(), genre).is_some() {
                return Err(GenreboxError::Config(format!(
                    "genre command `{token}` is defined twice"
                )));
            }
            order.push(token);
        }

        Ok(Self { order, by_token })
    }

    /// Looks up a command token, ignoring case.
    pub fn resolve(&self, token: &str) -> Option<&Genre> {
        match self.by_token.get(token) {
            Some(genre) => Some(genre),
            None => self.by_token.get(&token.to_lowercase()),
        }
    }

    /// Tokens in configuration order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// `(token, genre)` pairs in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Genre)> {
        self.order
            .iter()
            .filter_map(|token| self.by_token.get(token).map(|g| (token.as_str(), g)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
