//! Command tokens the relay sends or reacts to.

/// Registration complete.
pub const RPL_WELCOME: &str = "001";
/// Keep-alive probe from the server.
pub const PING: &str = "PING";
/// Keep-alive answer.
pub const PONG: &str = "PONG";
/// Chat line to a channel or user.
pub const PRIVMSG: &str = "PRIVMSG";
/// Enter a channel.
pub const JOIN: &str = "JOIN";
/// Password or OAuth token.
pub const PASS: &str = "PASS";
/// Nickname registration.
pub const NICK: &str = "NICK";
/// User registration.
pub const USER: &str = "USER";
/// Capability negotiation.
pub const CAP: &str = "CAP";
