//! Line-based codec for tokio.
//!
//! Splits a byte stream into newline-terminated UTF-8 lines and writes
//! lines back out verbatim.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Default maximum line length: 8191 bytes of tags plus a classic 512 byte line.
pub const MAX_LINE_LEN: usize = 8191 + 512;

/// Returns true for characters that may never appear inside a single line.
pub(crate) fn is_illegal_control_char(ch: char) -> bool {
    matches!(ch, '\0' | '\r' | '\n')
}

/// Line-based codec that handles newline-terminated messages.
///
/// Decoded lines have their `\r\n` (or bare `\n`) terminator stripped.
/// Blank lines are skipped rather than surfaced as empty items.
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
}

impl LineCodec {
    /// Create a new codec with the default maximum line length.
    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: MAX_LINE_LEN,
        }
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    fn validate_line(s: &str) -> error::Result<()> {
        match s.chars().find(|ch| is_illegal_control_char(*ch)) {
            Some(ch) => Err(error::ProtocolError::IllegalControlChar(ch)),
            None => Ok(()),
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                // No complete line yet - remember where we stopped
                self.next_index = src.len();

                if src.len() > self.max_len {
                    return Err(error::ProtocolError::MessageTooLong {
                        actual: src.len(),
                        limit: self.max_len,
                    });
                }

                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(error::ProtocolError::MessageTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            let data = String::from_utf8(line.to_vec()).map_err(|e| {
                error::ProtocolError::InvalidUtf8 {
                    raw_line: line.to_vec(),
                    byte_pos: e.utf8_error().valid_up_to(),
                    details: e.utf8_error().to_string(),
                }
            })?;

            let trimmed = data.trim_end_matches(['\r', '\n']);
            if trimmed.is_empty() {
                continue;
            }

            Self::validate_line(trimmed)?;
            return Ok(Some(trimmed.to_owned()));
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend_from_slice(msg.as_bytes());
        Ok(())
    }
}
