//! `FromStr` for [`Message`].

use std::str::FromStr;

use super::nom_parser::ParsedMessage;
use super::tags::unescape_tag_value;
use super::types::{Message, Tag};
use crate::error::{MessageParseError, ProtocolError};
use crate::prefix::Prefix;

/// Split a raw tag block into unescaped tags.
///
/// Empty entries are skipped; `key` and `key=` both produce a valueless tag.
fn parse_tags_string(raw: &str) -> Vec<Tag> {
    raw.split(';')
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, "")) => Tag::new(key, None),
            Some((key, value)) => Tag::new(key, Some(unescape_tag_value(value))),
            None => Tag::new(entry, None),
        })
        .collect()
}

fn invalid(line: &str, cause: MessageParseError) -> ProtocolError {
    ProtocolError::InvalidMessage {
        string: line.to_owned(),
        cause,
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Err(invalid(s, MessageParseError::EmptyMessage));
        }
        if line.starts_with('@') && !line.contains(' ') {
            return Err(invalid(s, MessageParseError::UnterminatedTags));
        }

        let parsed = ParsedMessage::parse(line).map_err(|e| {
            invalid(
                s,
                MessageParseError::ParseContext {
                    position: e.position,
                    context: format!("{:?}", e.kind),
                },
            )
        })?;

        let prefix = parsed
            .prefix
            .map(Prefix::try_from_str)
            .transpose()
            .map_err(|cause| invalid(s, cause))?;

        Ok(Message {
            tags: parsed.tags.map(parse_tags_string),
            prefix,
            command: parsed.command.to_owned(),
            params: parsed.params.iter().map(|p| (*p).to_owned()).collect(),
            trailing: parsed.trailing.map(str::to_owned),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_twitch_privmsg() {
        let msg: Message = "@badges=subscriber/12;color=#1E90FF;display-name=Some\\sOne;mod=0;subscriber=1;turbo=0;user-type= :someone!someone@someone.tmi.twitch.tv PRIVMSG #room :Kappa 123"
            .parse()
            .unwrap();

        assert_eq!(msg.source_nickname(), Some("someone"));
        assert_eq!(msg.tag_value("display-name"), Some("Some One"));
        assert_eq!(msg.tag_value("color"), Some("#1E90FF"));
        assert_eq!(msg.tag_value("user-type"), None);
        assert_eq!(msg.trailing.as_deref(), Some("Kappa 123"));
    }

    #[test]
    fn test_parse_ping() {
        let msg: Message = "PING :tmi.twitch.tv\r\n".parse().unwrap();
        assert!(msg.is_command("PING"));
        assert!(msg.params.is_empty());
        assert_eq!(msg.trailing.as_deref(), Some("tmi.twitch.tv"));
    }

    #[test]
    fn test_parse_welcome_numeric() {
        let msg: Message = ":tmi.twitch.tv 001 justinfan1 :Welcome, GLHF!".parse().unwrap();
        assert_eq!(msg.command, "001");
        assert_eq!(msg.params, vec!["justinfan1"]);
        assert_eq!(msg.prefix, Some(Prefix::ServerName("tmi.twitch.tv".into())));
    }

    #[test]
    fn test_parse_empty_is_error() {
        let err = "\r\n".parse::<Message>().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidMessage {
                cause: MessageParseError::EmptyMessage,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_unterminated_tags() {
        let err = "@color=#fff".parse::<Message>().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidMessage {
                cause: MessageParseError::UnterminatedTags,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_bad_command_reports_position() {
        let err = ":server 12 nick".parse::<Message>().unwrap_err();
        match err {
            ProtocolError::InvalidMessage {
                cause: MessageParseError::ParseContext { position, .. },
                ..
            } => assert_eq!(position, 8),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_tag_without_value() {
        let msg: Message = "@emote-only;slow= :tmi.twitch.tv ROOMSTATE #room".parse().unwrap();
        let tags = msg.tags.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0], Tag::new("emote-only", None));
        assert_eq!(tags[1], Tag::new("slow", None));
    }
}
