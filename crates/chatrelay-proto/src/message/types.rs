use crate::command;
use crate::prefix::Prefix;

/// An owned chat protocol message.
///
/// Holds the optional tag block, the optional prefix/source, the command
/// token, the ordered middle parameters and the optional trailing text.
///
/// # Example
///
/// ```
/// use chatrelay_proto::Message;
///
/// let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
/// assert_eq!(msg.source_nickname(), Some("nick"));
///
/// let reply = Message::privmsg("#channel", "Hi back");
/// assert_eq!(reply.to_string(), "PRIVMSG #channel :Hi back\r\n");
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message {
    /// Message tags (e.g., `color`, `display-name`).
    pub tags: Option<Vec<Tag>>,
    /// Message prefix/source (e.g., `nick!user@host`).
    pub prefix: Option<Prefix>,
    /// The command token (`PRIVMSG`, `PING`, `001`, ...).
    pub command: String,
    /// Middle parameters, in order.
    pub params: Vec<String>,
    /// Trailing free-text parameter.
    pub trailing: Option<String>,
}

impl Message {
    /// Create a message from a command, middle parameters and optional trailing text.
    #[must_use]
    pub fn new<C, P, T>(command: C, params: P, trailing: Option<T>) -> Self
    where
        C: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
        T: Into<String>,
    {
        Message {
            tags: None,
            prefix: None,
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
            trailing: trailing.map(Into::into),
        }
    }

    /// Get the nickname from the message prefix, if present.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// Get the value of a tag by key.
    ///
    /// Returns `None` both when the key is missing and when it carries no value.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .as_ref()?
            .iter()
            .find(|Tag(k, _)| k == key)
            .and_then(|Tag(_, v)| v.as_deref())
    }

    /// Whether this message carries the given command (case-insensitive).
    pub fn is_command(&self, command: &str) -> bool {
        self.command.eq_ignore_ascii_case(command)
    }

    /// Create a PRIVMSG to a target with text.
    #[must_use]
    pub fn privmsg<T, M>(target: T, text: M) -> Self
    where
        T: Into<String>,
        M: Into<String>,
    {
        Message::new(command::PRIVMSG, [target.into()], Some(text.into()))
    }

    /// Create a JOIN for a channel.
    #[must_use]
    pub fn join<C: Into<String>>(channel: C) -> Self {
        Message::new(command::JOIN, [channel.into()], None::<String>)
    }

    /// Create a PASS carrying a password or token.
    #[must_use]
    pub fn pass<P: Into<String>>(password: P) -> Self {
        Message::new(command::PASS, [password.into()], None::<String>)
    }

    /// Create a NICK.
    #[must_use]
    pub fn nick<N: Into<String>>(nickname: N) -> Self {
        Message::new(command::NICK, [nickname.into()], None::<String>)
    }

    /// Create a USER registration in the `USER <name> 0 * :<realname>` form.
    #[must_use]
    pub fn user<U, R>(username: U, realname: R) -> Self
    where
        U: Into<String>,
        R: Into<String>,
    {
        Message::new(
            command::USER,
            [username.into(), "0".to_string(), "*".to_string()],
            Some(realname.into()),
        )
    }

    /// Create a `CAP REQ` for a single capability.
    #[must_use]
    pub fn cap_req<C: Into<String>>(capability: C) -> Self {
        Message::new(command::CAP, ["REQ"], Some(capability.into()))
    }

    /// Create a PONG echoing the parameters and trailing text of a PING.
    #[must_use]
    pub fn pong_for(ping: &Message) -> Self {
        Message {
            tags: None,
            prefix: None,
            command: command::PONG.to_string(),
            params: ping.params.clone(),
            trailing: ping.trailing.clone(),
        }
    }

    /// Add a single tag to this message.
    #[must_use]
    pub fn with_tag<K, V>(mut self, key: K, value: Option<V>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let tag = Tag::new(key, value.map(Into::into));
        self.tags.get_or_insert_with(Vec::new).push(tag);
        self
    }

    /// Set the prefix/source of this message.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }
}

/// A message tag.
///
/// The value is optional; `@flag` and `@flag=` both decode to `None`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tag(
    /// Tag key (e.g., `color`).
    pub String,
    /// Optional tag value, unescaped.
    pub Option<String>,
);

impl Tag {
    /// Create a new tag with a key and optional value.
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Tag(key.into(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_registration_shape() {
        let msg = Message::user("bot", "bot");
        assert_eq!(msg.command, "USER");
        assert_eq!(msg.params, vec!["bot", "0", "*"]);
        assert_eq!(msg.trailing.as_deref(), Some("bot"));
    }

    #[test]
    fn test_pong_for_echoes_ping() {
        let ping = Message::new("PING", ["a", "b"], Some("tmi.twitch.tv"));
        let pong = Message::pong_for(&ping);

        assert_eq!(pong.command, "PONG");
        assert_eq!(pong.params, ping.params);
        assert_eq!(pong.trailing, ping.trailing);
    }

    #[test]
    fn test_tag_value_missing_and_valueless() {
        let msg = Message::privmsg("#room", "hi")
            .with_tag("color", Some("#123456"))
            .with_tag("mod", None::<String>);

        assert_eq!(msg.tag_value("color"), Some("#123456"));
        assert_eq!(msg.tag_value("mod"), None);
        assert_eq!(msg.tag_value("absent"), None);
    }

    #[test]
    fn test_is_command_ignores_case() {
        let msg = Message::new("privmsg", ["#room"], Some("x"));
        assert!(msg.is_command("PRIVMSG"));
        assert!(!msg.is_command("NOTICE"));
    }
}
