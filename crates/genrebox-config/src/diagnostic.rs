// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Miette diagnostics for `genrebox.toml`.
//!
//! Figment reports where a bad key lives only as a table path, and not at all
//! for entries of the `[[genres]]` array. The helpers here scan the TOML
//! layout table by table so a diagnostic can point at the exact line, and
//! name the array entry it belongs to.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::collections::HashMap;
use std::ops::Range;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error, rendered by miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}` in {table}")]
    #[diagnostic(
        code(genrebox::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Table the key was found in, e.g. `[bot]` or `[[genres]] entry 2`.
        table: String,
        suggestion: Option<String>,
        /// Comma-separated keys the table accepts.
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(genrebox::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted key path, e.g. `storage.wal_mode`.
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("missing required key `{key}` in {table}")]
    #[diagnostic(
        code(genrebox::config::missing_key),
        help("add `{key} = <value>` to {table}")
    )]
    MissingKey {
        key: String,
        table: String,
        #[label("required key missing from this table")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("validation error: {message}")]
    #[diagnostic(code(genrebox::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(genrebox::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Converts every error inside a `figment::Error` into a [`ConfigError`].
///
/// `toml_sources` holds `(path, content)` pairs of the files that were
/// merged; they are used to attach source spans.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    let mut errors = Vec::new();

    for error in err {
        let source = source_for(&error, toml_sources);
        let path = &error.path;

        let config_error = match &error.kind {
            Kind::UnknownField(field, expected) => {
                let valid_keys: Vec<&str> = expected.to_vec();
                let found = source.and_then(|(_, content)| locate_key(content, path, field));
                ConfigError::UnknownKey {
                    key: field.clone(),
                    table: found
                        .as_ref()
                        .map_or_else(|| describe_path(path), |f| f.table.clone()),
                    suggestion: suggest_key(field, &valid_keys),
                    valid_keys: valid_keys.join(", "),
                    span: found.as_ref().map(|f| f.span()),
                    src: found.and(source).map(named_source),
                }
            }
            Kind::MissingField(field) => {
                let found =
                    source.and_then(|(_, content)| locate_missing(content, path, field));
                ConfigError::MissingKey {
                    key: field.clone().into_owned(),
                    table: found
                        .as_ref()
                        .map_or_else(|| describe_path(path), |f| f.table.clone()),
                    span: found.as_ref().map(|f| f.span()),
                    src: found.and(source).map(named_source),
                }
            }
            Kind::InvalidType(actual, expected) => {
                let found = source.and_then(|(_, content)| {
                    let (field, table) = path.split_last()?;
                    locate_value(content, table, field)
                });
                ConfigError::InvalidType {
                    key: path.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                    span: found.as_ref().map(|f| f.span()),
                    src: found.and(source).map(named_source),
                }
            }
            _ => ConfigError::Other(format!("{error}")),
        };

        errors.push(config_error);
    }

    errors
}

/// Picks the merged file an error came from.
///
/// Inline strings carry no file metadata, and file paths may be reported in
/// canonical form, so a lone source is used whenever the lookup misses.
fn source_for<'a>(
    error: &figment::Error,
    toml_sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let by_path = file.and_then(|path| toml_sources.iter().find(|(p, _)| *p == path));
    let chosen = match (by_path, toml_sources) {
        (Some(found), _) => Some(found),
        (None, [only]) => Some(only),
        (None, _) => None,
    };
    chosen.map(|(p, c)| (p.as_str(), c.as_str()))
}

fn named_source((path, content): (&str, &str)) -> NamedSource<String> {
    NamedSource::new(path, content.to_string())
}

/// Array-of-tables sections in `genrebox.toml`.
const ARRAY_TABLES: &[&str] = &["genres"];

/// Describes a figment path when the source could not be scanned.
fn describe_path(path: &[String]) -> String {
    let (table, entry) = split_table_path(path);
    if table.is_empty() {
        "the top level".to_string()
    } else if ARRAY_TABLES.contains(&table.as_str()) {
        match entry {
            Some(i) => format!("[[{table}]] entry {}", i + 1),
            None => format!("[[{table}]]"),
        }
    } else {
        format!("[{table}]")
    }
}

/// Splits a figment path into the table name and an array index, if any.
fn split_table_path(path: &[String]) -> (String, Option<usize>) {
    let mut names = Vec::new();
    let mut entry = None;
    for segment in path {
        match segment.parse::<usize>() {
            Ok(i) => entry = Some(i),
            Err(_) => names.push(segment.as_str()),
        }
    }
    (names.join("."), entry)
}

/// One table of a TOML document.
#[derive(Debug)]
struct Block<'a> {
    /// Table name; empty for the keys before the first header.
    name: &'a str,
    /// Position among `[[name]]` entries, for array tables.
    entry: Option<usize>,
    /// Byte range of the header line, without its newline.
    header: Range<usize>,
    /// Byte range of the table's key/value lines.
    body: Range<usize>,
}

impl Block<'_> {
    fn describe(&self) -> String {
        match (self.name, self.entry) {
            ("", _) => "the top level".to_string(),
            (name, Some(i)) => format!("[[{name}]] entry {}", i + 1),
            (name, None) => format!("[{name}]"),
        }
    }
}

/// Splits `content` into its tables, in document order.
fn blocks(content: &str) -> Vec<Block<'_>> {
    let mut blocks = vec![Block {
        name: "",
        entry: None,
        header: 0..0,
        body: 0..content.len(),
    }];
    let mut entries: HashMap<&str, usize> = HashMap::new();

    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let Some((name, array)) = parse_header(line) else {
            continue;
        };
        if let Some(last) = blocks.last_mut() {
            last.body.end = start;
        }
        let entry = array.then(|| {
            let seen = entries.entry(name).or_insert(0);
            *seen += 1;
            *seen - 1
        });
        blocks.push(Block {
            name,
            entry,
            header: start..start + line.trim_end().len(),
            body: offset..content.len(),
        });
    }

    blocks
}

/// Parses `[name]` or `[[name]]`, ignoring trailing comments.
fn parse_header(line: &str) -> Option<(&str, bool)> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix("[[") {
        let end = rest.find("]]")?;
        return Some((rest[..end].trim(), true));
    }
    let rest = line.strip_prefix('[')?;
    let end = rest.find(']')?;
    Some((rest[..end].trim(), false))
}

/// A resolved position inside a TOML source.
#[derive(Debug)]
struct Found {
    offset: usize,
    len: usize,
    table: String,
}

impl Found {
    fn span(&self) -> SourceSpan {
        SourceSpan::new(self.offset.into(), self.len)
    }
}

/// Tables a figment path may refer to.
///
/// An explicit index selects one `[[array]]` entry; without one every entry
/// is a candidate. An empty path also matches every table, because figment
/// does not always record where an unknown field was nested.
fn candidates<'a>(content: &'a str, path: &[String]) -> Vec<Block<'a>> {
    let (table, entry) = split_table_path(path);
    let all = blocks(content);
    if path.is_empty() {
        return all;
    }
    all.into_iter()
        .filter(|b| b.name == table)
        .filter(|b| entry.is_none() || b.entry == entry)
        .collect()
}

/// Byte offset of `field` at the start of a line inside `range`.
fn key_in(content: &str, range: Range<usize>, field: &str) -> Option<usize> {
    let mut offset = range.start;
    for line in content[range].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(after) = trimmed.strip_prefix(field)
            && after.trim_start().starts_with('=')
        {
            return Some(offset + line.len() - trimmed.len());
        }
        offset += line.len();
    }
    None
}

fn locate_key(content: &str, path: &[String], field: &str) -> Option<Found> {
    candidates(content, path).into_iter().find_map(|block| {
        key_in(content, block.body.clone(), field).map(|offset| Found {
            offset,
            len: field.len(),
            table: block.describe(),
        })
    })
}

/// Finds the value assigned to `field`, for type errors.
fn locate_value(content: &str, table: &[String], field: &str) -> Option<Found> {
    let key = locate_key(content, table, field)?;
    let line_end = content[key.offset..]
        .find('\n')
        .map_or(content.len(), |i| key.offset + i);
    let line = &content[key.offset..line_end];
    let eq = line.find('=')?;
    let value = line[eq + 1..].trim();
    let start = key.offset + eq + 1 + (line[eq + 1..].len() - line[eq + 1..].trim_start().len());
    Some(Found {
        offset: start,
        len: value.len(),
        table: key.table,
    })
}

/// Finds the first candidate table that lacks `field` and points at its header.
fn locate_missing(content: &str, path: &[String], field: &str) -> Option<Found> {
    candidates(content, path)
        .into_iter()
        .filter(|block| !block.name.is_empty())
        .find(|block| key_in(content, block.body.clone(), field).is_none())
        .map(|block| Found {
            offset: block.header.start,
            len: block.header.len(),
            table: block.describe(),
        })
}

/// Byte offset of `field` within the table named by `path`.
///
/// For `[[genres]]`, pass `["genres", "<index>"]` to pick one entry; with
/// `["genres"]` alone the first entry containing the key wins.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    locate_key(content, path, field).map(|found| found.offset)
}

/// Suggest a similar key name using Jaro-Winkler string similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > best_score {
            best_score = score;
            best_match = Some(key.to_string());
        }
    }

    best_match
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_GENRES: &str = "\
[bot]
name = \"gb\"

[[genres]]
token = \"techno\"
genre = \"techno\"

[[genres]]  # second entry
token = \"dnb\"
gnere = \"drum and bass\"
";

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn suggest_database_path_for_typo() {
        let valid = &["database_path", "wal_mode"];
        assert_eq!(
            suggest_key("databse_path", valid),
            Some("database_path".to_string())
        );
    }

    #[test]
    fn suggest_genre_for_swapped_letters() {
        assert_eq!(
            suggest_key("gnere", &["token", "genre"]),
            Some("genre".to_string())
        );
        assert_eq!(suggest_key("tokn", &["token", "genre"]), Some("token".to_string()));
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["name", "log_level", "user_queue_capacity"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn blocks_number_array_entries() {
        let blocks = blocks(TWO_GENRES);
        let described: Vec<String> = blocks.iter().map(Block::describe).collect();
        assert_eq!(
            described,
            vec![
                "the top level",
                "[bot]",
                "[[genres]] entry 1",
                "[[genres]] entry 2"
            ]
        );
        assert_eq!(&TWO_GENRES[blocks[3].header.clone()], "[[genres]]  # second entry");
    }

    #[test]
    fn find_key_offset_in_section() {
        let content = "[bot]\nnaem = \"test\"\n";
        let o = find_key_offset(content, &path(&["bot"]), "naem").unwrap();
        assert_eq!(&content[o..o + 4], "naem");
    }

    #[test]
    fn key_in_other_table_is_not_matched() {
        let content = "[storage]\nname = \"x\"\n\n[bot]\nlog_level = \"info\"\n";
        assert_eq!(find_key_offset(content, &path(&["bot"]), "name"), None);
    }

    #[test]
    fn array_entry_is_selected_by_index() {
        let token_in_second = find_key_offset(TWO_GENRES, &path(&["genres", "1"]), "token");
        let token_in_first = find_key_offset(TWO_GENRES, &path(&["genres", "0"]), "token");
        assert!(token_in_second > token_in_first);
        assert_eq!(&TWO_GENRES[token_in_second.unwrap()..][..13], "token = \"dnb\"");
    }

    #[test]
    fn array_key_without_index_searches_every_entry() {
        let found = locate_key(TWO_GENRES, &path(&["genres"]), "gnere").unwrap();
        assert_eq!(found.table, "[[genres]] entry 2");
        assert_eq!(&TWO_GENRES[found.offset..found.offset + found.len], "gnere");
    }

    #[test]
    fn missing_key_points_at_entry_header() {
        let found = locate_missing(TWO_GENRES, &path(&["genres"]), "genre").unwrap();
        assert_eq!(found.table, "[[genres]] entry 2");
        assert!(TWO_GENRES[found.offset..].starts_with("[[genres]]  # second"));
    }

    #[test]
    fn value_span_covers_the_value() {
        let content = "[storage]\nwal_mode = \"yes\"\n";
        let found = locate_value(content, &path(&["storage"]), "wal_mode").unwrap();
        assert_eq!(&content[found.offset..found.offset + found.len], "\"yes\"");
    }

    #[test]
    fn describe_path_without_source() {
        assert_eq!(describe_path(&[]), "the top level");
        assert_eq!(describe_path(&path(&["telegram"])), "[telegram]");
        assert_eq!(describe_path(&path(&["genres"])), "[[genres]]");
        assert_eq!(describe_path(&path(&["genres", "2"])), "[[genres]] entry 3");
    }

    #[test]
    fn unknown_key_help_lists_suggestion() {
        let help = unknown_key_help(Some("bot_token"), "bot_token");
        assert!(help.starts_with("did you mean `bot_token`?"));
        let help = unknown_key_help(None, "token, genre");
        assert_eq!(help, "valid keys: token, genre");
    }

    #[test]
    fn figment_unknown_field_in_genre_entry_gets_span_and_suggestion() {
        let err = crate::loader::load_config_from_str(TWO_GENRES)
            .expect_err("unknown key must be rejected");
        let sources = vec![("genrebox.toml".to_string(), TWO_GENRES.to_string())];
        let errors = figment_to_config_errors(err, &sources);
        let unknown = errors
            .iter()
            .find_map(|e| match e {
                ConfigError::UnknownKey {
                    key,
                    table,
                    suggestion,
                    span,
                    ..
                } => Some((key, table, suggestion, span)),
                _ => None,
            })
            .expect("an unknown key error");
        assert_eq!(unknown.0, "gnere");
        assert_eq!(unknown.1, "[[genres]] entry 2");
        assert_eq!(unknown.2.as_deref(), Some("genre"));
        let span = unknown.3.expect("span resolved from the inline source");
        assert_eq!(&TWO_GENRES[span.offset()..span.offset() + span.len()], "gnere");
    }

    #[test]
    fn figment_unknown_field_becomes_unknown_key() {
        let err = crate::loader::load_config_from_str("[telegram]\nbot_tken = \"x\"\n")
            .expect_err("unknown key must be rejected");
        let errors = figment_to_config_errors(err, &[]);
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, span: None, .. }
                if key == "bot_tken" && suggestion.as_deref() == Some("bot_token")
        )));
    }
}
