//! # chatrelay-proto
//!
//! Parsing and serialization for the line-oriented, tag-annotated chat
//! protocol spoken by the upstream chat server.
//!
//! A line has the shape
//!
//! ```text
//! [@k1=v1;k2=v2] [:prefix] COMMAND [param ...] [:trailing text]\r\n
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use chatrelay_proto::Message;
//!
//! let raw = "@color=#FF0000;display-name=Foo :foo!foo@host PRIVMSG #room :hello";
//! let msg: Message = raw.parse().expect("valid line");
//!
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.params, vec!["#room".to_string()]);
//! assert_eq!(msg.trailing.as_deref(), Some("hello"));
//! assert_eq!(msg.tag_value("color"), Some("#FF0000"));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod caps;
#[cfg(feature = "tokio")]
pub mod codec;
pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod prefix;

pub use self::caps::Capability;
#[cfg(feature = "tokio")]
pub use self::codec::ChatCodec;
pub use self::error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::{Message, Tag};
pub use self::prefix::Prefix;
