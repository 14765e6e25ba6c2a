//! The IRCv3 tagged-message codec Twitch chat uses on the wire.

mod prefix;
mod tags;

pub use prefix::Source;
pub use tags::IrcTags;

use thiserror::Error;

/// Error parsing a raw IRC line into an [`IrcMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line was empty.
    #[error("raw IRC message must not be blank")]
    BlankRawMessage,
}

/// A single parsed IRC line: optional tags, optional source, a command, and parameters.
///
/// Construction never fails on malformed *structure* beyond an entirely empty line -- garbage
/// input simply produces a garbage-structured message, which is the behavior the session engine's
/// parser task relies on to log-and-drop rather than panic on unexpected servers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcMessage {
    pub tags: IrcTags,
    pub source: Option<Source>,
    pub command: String,
    pub params: Vec<String>,
    /// The original line, kept around for diagnostics/logging.
    pub raw: String,
}

impl IrcMessage {
    /// Parse a single line, already stripped of its trailing `\r\n`.
    pub fn parse(line: &str) -> Result<IrcMessage, ParseError> {
        if line.is_empty() {
            return Err(ParseError::BlankRawMessage);
        }

        let mut rest = line;
        let mut tags = IrcTags::new();
        let mut source = None;

        if let Some(tags_str) = rest.strip_prefix('@') {
            let (tags_part, remainder) = split_first_token(tags_str);
            tags = IrcTags::parse(tags_part);
            rest = remainder;
        }

        if let Some(source_str) = rest.strip_prefix(':') {
            let (source_part, remainder) = split_first_token(source_str);
            source = Some(Source::parse(source_part));
            rest = remainder;
        }

        let (command, remainder) = split_first_token(rest);
        let command = command.to_owned();

        let params = parse_params(remainder);

        Ok(IrcMessage {
            tags,
            source,
            command,
            params,
            raw: line.to_owned(),
        })
    }
}

/// Split `s` on the first space into `(before, after)`, with `after` having any further leading
/// spaces stripped. If there's no space, the whole string is the first token and `after` is empty.
fn split_first_token(s: &str) -> (&str, &str) {
    match s.split_once(' ') {
        Some((first, rest)) => (first, rest.trim_start_matches(' ')),
        None => (s, ""),
    }
}

/// Parse the parameter list using the trailing-parameter convention: a space-prefixed `:` starts
/// a single final parameter that runs to the end of the line, including embedded spaces.
fn parse_params(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }

    let mut params = Vec::new();
    let mut rest = s;
    loop {
        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing.to_owned());
            break;
        }
        match rest.split_once(' ') {
            Some((first, remainder)) => {
                params.push(first.to_owned());
                rest = remainder;
            }
            None => {
                params.push(rest.to_owned());
                break;
            }
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;

    #[test]
    fn parses_privmsg_with_trailing_param() {
        let msg = IrcMessage::parse(":nick!user@host PRIVMSG #chan :hello world").unwrap();
        assert_eq!(msg.source.as_ref().unwrap().nickname.as_deref(), Some("nick"));
        assert_eq!(msg.source.as_ref().unwrap().username.as_deref(), Some("user"));
        assert_eq!(msg.source.as_ref().unwrap().host.as_deref(), Some("host"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#chan".to_owned(), "hello world".to_owned()]);
        assert!(msg.tags.is_empty());
    }

    #[test]
    fn parses_tags_and_triple_source() {
        let msg = IrcMessage::parse(
            "@badge-info=;color=#FF0000;id=abc :nick!nick@nick.tmi.twitch.tv PRIVMSG #chan :hi",
        )
        .unwrap();
        assert_eq!(
            *msg.tags,
            hashmap! {
                "badge-info".to_owned() => "".to_owned(),
                "color".to_owned() => "#FF0000".to_owned(),
                "id".to_owned() => "abc".to_owned(),
            }
        );
        assert_eq!(msg.params, vec!["#chan".to_owned(), "hi".to_owned()]);
    }

    #[test]
    fn parses_numeric_welcome() {
        let msg = IrcMessage::parse(":tmi.twitch.tv 001 botname :Welcome, GLHF!").unwrap();
        assert_eq!(msg.source.as_ref().unwrap().host.as_deref(), Some("tmi.twitch.tv"));
        assert_eq!(msg.command, "001");
        assert_eq!(
            msg.params,
            vec!["botname".to_owned(), "Welcome, GLHF!".to_owned()]
        );
    }

    #[test]
    fn parses_ping_with_no_source() {
        let msg = IrcMessage::parse("PING :tmi.twitch.tv").unwrap();
        assert!(msg.source.is_none());
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params, vec!["tmi.twitch.tv".to_owned()]);
    }

    #[test]
    fn blank_line_is_an_error() {
        assert_eq!(IrcMessage::parse(""), Err(ParseError::BlankRawMessage));
    }

    #[test]
    fn command_with_no_params() {
        let msg = IrcMessage::parse("PING").unwrap();
        assert_eq!(msg.command, "PING");
        assert!(msg.params.is_empty());
    }
}
