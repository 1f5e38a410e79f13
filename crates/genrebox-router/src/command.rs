// SPDX-FileCopyrightText: 2026 Genrebox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slash-command parsing.

/// A parsed `/command args` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    /// Lowercased command word without the slash or `@botname` suffix.
    pub token: String,
    /// The `@botname` the command was addressed to, if any.
    pub addressee: Option<&'a str>,
    /// Everything after the first whitespace, trimmed. May be empty.
    pub args: &'a str,
}

impl<'a> Command<'a> {
    /// Parses a message text. Returns `None` for text that is not a command.
    pub fn parse(text: &'a str) -> Option<Self> {
        let rest = text.trim_start().strip_prefix('/')?;
        let (word, args) = match rest.find(char::is_whitespace) {
            Some(idx) => (&rest[..idx], rest[idx..].trim()),
            None => (rest, ""),
        };
        let (word, addressee) = match word.split_once('@') {
            Some((name, bot)) => (name, Some(bot)),
            None => (word, None),
        };
        Some(Self {
            token: word.to_lowercase(),
            addressee,
            args,
        })
    }

    /// Whether a bot called `username` should handle this command.
    ///
    /// Commands without a mention are for everyone. With `username` unknown,
    /// mentions cannot be checked and every command is accepted.
    pub fn is_for(&self, username: Option<&str>) -> bool {
        match (self.addressee, username) {
            (Some(addressee), Some(me)) => addressee.eq_ignore_ascii_case(me),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_and_args() {
        let cmd = Command::parse("/add  Dark Jungle ").unwrap();
        assert_eq!(cmd.token, "add");
        assert_eq!(cmd.args, "Dark Jungle");
    }

    #[test]
    fn missing_args_are_empty() {
        let cmd = Command::parse("/start").unwrap();
        assert_eq!(cmd.token, "start");
        assert_eq!(cmd.args, "");
    }

    #[test]
    fn strips_bot_mention_and_lowercases() {
        let cmd = Command::parse("/Techno@genrebox_bot").unwrap();
        assert_eq!(cmd.token, "techno");
        assert_eq!(cmd.addressee, Some("genrebox_bot"));
        let cmd = Command::parse("/add@genrebox_bot house").unwrap();
        assert_eq!(cmd.token, "add");
        assert_eq!(cmd.args, "house");
    }

    #[test]
    fn mention_of_another_bot_is_not_for_us() {
        let cmd = Command::parse("/techno@someotherbot").unwrap();
        assert!(!cmd.is_for(Some("genrebox_bot")));
        assert!(cmd.is_for(Some("SomeOtherBot")));
        assert!(cmd.is_for(None));
    }

    #[test]
    fn unaddressed_command_is_for_everyone() {
        let cmd = Command::parse("/techno").unwrap();
        assert_eq!(cmd.addressee, None);
        assert!(cmd.is_for(Some("genrebox_bot")));
    }

    #[test]
    fn args_split_on_any_whitespace() {
        let cmd = Command::parse("/add\nebm").unwrap();
        assert_eq!(cmd.token, "add");
        assert_eq!(cmd.args, "ebm");
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert!(Command::parse("techno please").is_none());
        assert!(Command::parse("").is_none());
    }

    #[test]
    fn bare_slash_has_empty_token() {
        let cmd = Command::parse("/").unwrap();
        assert_eq!(cmd.token, "");
    }
}
