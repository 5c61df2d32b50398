//! Capabilities requested from the chat server after registration.

use std::fmt;

/// A server capability the session asks for with `CAP REQ`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// JOIN/PART membership notifications.
    Membership,
    /// Per-message tags (color, display name, badges).
    Tags,
    /// Server specific commands such as CLEARCHAT.
    Commands,
}

impl Capability {
    /// Every capability, in the order they are requested.
    pub const ALL: [Capability; 3] = [
        Capability::Membership,
        Capability::Tags,
        Capability::Commands,
    ];

    /// The capability name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Membership => "twitch.tv/membership",
            Capability::Tags => "twitch.tv/tags",
            Capability::Commands => "twitch.tv/commands",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_capability_is_requested() {
        assert!(Capability::ALL.contains(&Capability::Tags));
        assert_eq!(Capability::Tags.to_string(), "twitch.tv/tags");
    }
}
