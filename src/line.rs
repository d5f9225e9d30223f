//! Line framing for tokio.
//!
//! [`LineCodec`] splits an inbound byte stream on `\n`, strips the CR-LF
//! terminator and yields each line as a `String`. Invalid UTF-8 is replaced
//! rather than rejected, and lines over the limit are dropped with a warning
//! so a single bad line never ends the stream.

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::warn;

use crate::error::{self, ProtocolError};
use crate::util::MAX_INBOUND_LINE;

/// Newline-delimited line decoder.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length, terminator included
    max_len: usize,
    /// Set while skipping the rest of an overlong line
    discarding: bool,
}

impl LineCodec {
    /// A codec accepting lines up to [`MAX_INBOUND_LINE`] bytes.
    pub fn new() -> Self {
        Self::with_max_len(MAX_INBOUND_LINE)
    }

    /// A codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        LineCodec {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }

    fn discard(&self, actual: usize) {
        let err = ProtocolError::MessageTooLong {
            actual,
            limit: self.max_len,
        };
        warn!(error = %err, "discarding inbound line");
    }

    fn finish_line(line: &[u8]) -> String {
        let line = match line.strip_suffix(b"\n") {
            Some(l) => l,
            None => line,
        };
        let line = match line.strip_suffix(b"\r") {
            Some(l) => l,
            None => line,
        };
        String::from_utf8_lossy(line).into_owned()
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if src.len() > self.max_len {
                    if !self.discarding {
                        self.discard(src.len());
                    }
                    self.discarding = true;
                    src.clear();
                    self.next_index = 0;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let end = self.next_index + offset + 1;
            self.next_index = 0;

            if self.discarding {
                src.advance(end);
                self.discarding = false;
                continue;
            }
            if end > self.max_len {
                self.discard(end);
                src.advance(end);
                continue;
            }

            let line = src.split_to(end);
            return Ok(Some(Self::finish_line(&line)));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        // a final line without a terminator
        self.next_index = 0;
        if src.is_empty() || self.discarding {
            src.clear();
            self.discarding = false;
            return Ok(None);
        }
        let line = src.split_to(src.len());
        Ok(Some(Self::finish_line(&line)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :test\r\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("PING :test".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_bare_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :a\nPING :b\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :a".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :b".to_string()));
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"x\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :x".to_string()));
    }

    #[test]
    fn test_overlong_line_is_skipped() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\nPING\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING".to_string()));
    }

    #[test]
    fn test_overlong_partial_line_is_skipped() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert!(buf.is_empty());

        buf.extend_from_slice(b" still\r\nPONG\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PONG".to_string()));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PRIVMSG #a :\xff\r\n"[..]);
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("PRIVMSG #a :\u{fffd}".to_string())
        );
    }

    #[test]
    fn test_decode_eof_yields_unterminated_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("ERROR :bye");
        assert_eq!(
            codec.decode_eof(&mut buf).unwrap(),
            Some("ERROR :bye".to_string())
        );
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }
}
