//! Chat message codec for tokio.
//!
//! Wraps [`LineCodec`] and parses each line into a [`Message`].

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;
use crate::line::LineCodec;
use crate::message::Message;

/// Tokio codec for encoding/decoding chat protocol messages.
#[derive(Default)]
pub struct ChatCodec {
    inner: LineCodec,
}

impl ChatCodec {
    /// Create a new codec with the default maximum line length.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }

    /// Sanitize outgoing message data.
    ///
    /// Everything after the first line ending is dropped, so user supplied
    /// text can never smuggle a second command onto the wire.
    pub fn sanitize(mut data: String) -> error::Result<String> {
        let body_len = data.trim_end_matches(['\r', '\n']).len();
        if let Some(pos) = data[..body_len].find(['\r', '\n']) {
            data.truncate(pos);
            data.push_str("\r\n");
        }

        if let Some(ch) = data.chars().find(|ch| *ch == '\0') {
            return Err(error::ProtocolError::IllegalControlChar(ch));
        }

        Ok(data)
    }
}

impl Decoder for ChatCodec {
    type Item = Message;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        self.inner
            .decode(src)
            .and_then(|res| res.map_or(Ok(None), |line| line.parse::<Message>().map(Some)))
    }
}

impl Encoder<Message> for ChatCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> error::Result<()> {
        let sanitized = Self::sanitize(msg.to_string())?;
        self.inner.encode(sanitized, dst)
    }
}
