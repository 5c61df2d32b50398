//! Error types for the chat protocol codec.
//!
//! [`ProtocolError`] covers everything that can go wrong while moving bytes
//! on and off the wire; [`MessageParseError`] describes why a single line
//! could not be understood.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid UTF-8 bytes in a received line.
    #[error("invalid UTF-8 in message at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// The raw line as received.
        raw_line: Vec<u8>,
        /// Byte position where UTF-8 validation failed.
        byte_pos: usize,
        /// Detailed error message from the UTF-8 decoder.
        details: String,
    },

    /// Line exceeded the configured maximum length.
    #[error("message too long: {actual} bytes (limit: {limit})")]
    MessageTooLong {
        /// Actual line length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Illegal control character in a line.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// Failed to parse a line into a [`Message`](crate::Message).
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The offending line.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing a single protocol line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty.
    #[error("empty message")]
    EmptyMessage,

    /// Command was invalid or missing.
    #[error("invalid command")]
    InvalidCommand,

    /// Prefix contained characters that are not allowed.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),

    /// Tag block was opened with `@` but never followed by a space.
    #[error("unterminated tags section")]
    UnterminatedTags,

    /// Parsing failed at a known position.
    #[error("parsing failed at position {position}: {context}")]
    ParseContext {
        /// Byte position where parsing failed.
        position: usize,
        /// Description of what was being parsed.
        context: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::MessageTooLong {
            actual: 9000,
            limit: 8704,
        };
        assert_eq!(
            format!("{}", err),
            "message too long: 9000 bytes (limit: 8704)"
        );

        let err = MessageParseError::ParseContext {
            position: 3,
            context: "command".to_string(),
        };
        assert_eq!(format!("{}", err), "parsing failed at position 3: command");
    }

    #[test]
    fn test_protocol_error_chaining() {
        let cause = MessageParseError::InvalidCommand;
        let err = ProtocolError::InvalidMessage {
            string: "!!!".to_string(),
            cause: cause.clone(),
        };

        let source = std::error::Error::source(&err);
        assert_eq!(source.map(|s| s.to_string()), Some(cause.to_string()));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err: ProtocolError = io_err.into();
        assert!(matches!(err, ProtocolError::Io(_)));
    }
}
