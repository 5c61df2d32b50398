//! Wire serialization for [`Message`].

use std::fmt::{self, Write};

use super::tags::escape_tag_value;
use super::types::{Message, Tag};

impl fmt::Display for Message {
    /// Writes the message in wire form, terminated by `\r\n`.
    ///
    /// The trailing parameter is always written with a leading `:`, so an
    /// empty trailing is preserved.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tags) = self.tags.as_deref().filter(|t| !t.is_empty()) {
            f.write_char('@')?;
            for (i, Tag(key, value)) in tags.iter().enumerate() {
                if i > 0 {
                    f.write_char(';')?;
                }
                f.write_str(key)?;
                if let Some(value) = value {
                    f.write_char('=')?;
                    escape_tag_value(f, value)?;
                }
            }
            f.write_char(' ')?;
        }

        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }

        f.write_str(&self.command)?;

        for param in &self.params {
            write!(f, " {param}")?;
        }

        if let Some(trailing) = &self.trailing {
            write!(f, " :{trailing}")?;
        }

        f.write_str("\r\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefix::Prefix;

    #[test]
    fn test_registration_lines() {
        assert_eq!(Message::pass("oauth:abc").to_string(), "PASS oauth:abc\r\n");
        assert_eq!(Message::nick("bot").to_string(), "NICK bot\r\n");
        assert_eq!(Message::user("bot", "bot").to_string(), "USER bot 0 * :bot\r\n");
        assert_eq!(
            Message::cap_req("twitch.tv/tags").to_string(),
            "CAP REQ :twitch.tv/tags\r\n"
        );
    }

    #[test]
    fn test_empty_trailing_is_kept() {
        assert_eq!(Message::privmsg("#room", "").to_string(), "PRIVMSG #room :\r\n");
    }

    #[test]
    fn test_tags_and_prefix() {
        let msg = Message::privmsg("#room", "hi")
            .with_prefix(Prefix::new_from_str("a!a@a.tmi.twitch.tv"))
            .with_tag("display-name", Some("A B"))
            .with_tag("mod", None::<String>);

        assert_eq!(
            msg.to_string(),
            "@display-name=A\\sB;mod :a!a@a.tmi.twitch.tv PRIVMSG #room :hi\r\n"
        );
    }

    #[test]
    fn test_parse_of_serialized_keeps_fields() {
        let original = Message::privmsg("#room", "semi;colon and spaces")
            .with_tag("color", Some("#FF4500"));
        let parsed: Message = original.to_string().parse().unwrap();
        assert_eq!(parsed, original);
    }
}
