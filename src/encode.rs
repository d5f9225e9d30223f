//! Encoding messages for transmission.
//!
//! [`IrcEncode`] is the capability a [`MessageWriter`](crate::MessageWriter)
//! accepts: anything that can append one or more CR-LF terminated lines to a
//! buffer. [`Message`](crate::Message) validates its fields; raw strings are
//! passed through and only get a terminator appended.
//!
//! # Example
//!
//! ```
//! use slirc_conn::encode::IrcEncode;
//! use slirc_conn::Message;
//!
//! let msg = Message::privmsg("#channel", "Hello!");
//! let mut buf = Vec::new();
//! let warning = msg.encode(&mut buf).unwrap();
//!
//! assert!(warning.is_none());
//! assert_eq!(&buf, b"PRIVMSG #channel :Hello!\r\n");
//! ```

use crate::error::{EncodeError, EncodeWarning};
use crate::prefix::Prefix;
use crate::util::{check_body_length, check_param_count, check_tags_length};

/// A value that serializes itself to IRC wire bytes.
///
/// Hard errors mean nothing was appended. A warning means the bytes were
/// appended but exceed a protocol ceiling and may be truncated or rejected.
pub trait IrcEncode {
    /// Append the wire form to `buf`, accounting for the prefix a server
    /// prepends when relaying the line from `origin` to other clients.
    ///
    /// Pass an empty prefix when the relay overhead is unknown.
    fn encode_relayed(
        &self,
        buf: &mut Vec<u8>,
        origin: &Prefix,
    ) -> Result<Option<EncodeWarning>, EncodeError>;

    /// Append the wire form, including CR-LF, to `buf`.
    fn encode(&self, buf: &mut Vec<u8>) -> Result<Option<EncodeWarning>, EncodeError> {
        self.encode_relayed(buf, &Prefix::default())
    }

    /// Encode to a new buffer, discarding any warning.
    fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::with_capacity(512);
        self.encode(&mut buf)?;
        Ok(buf)
    }
}

/// Bytes a server adds in front of a relayed line: `:nick!user@host `.
pub(crate) fn relay_overhead(origin: &Prefix) -> usize {
    if origin.is_empty() {
        0
    } else {
        origin.to_string().len() + 2
    }
}

/// Collect the soft-limit violations for one encoded line.
pub(crate) fn measure(tags_len: usize, body_len: usize, params: usize) -> Option<EncodeWarning> {
    EncodeWarning {
        tags_len: check_tags_length(tags_len),
        body_len: check_body_length(body_len),
        params: check_param_count(params),
    }
    .into_option()
}

impl IrcEncode for str {
    fn encode_relayed(
        &self,
        buf: &mut Vec<u8>,
        origin: &Prefix,
    ) -> Result<Option<EncodeWarning>, EncodeError> {
        let line = self.trim_end_matches(&['\r', '\n'][..]);
        buf.extend_from_slice(line.as_bytes());
        buf.extend_from_slice(b"\r\n");

        if line.contains(&['\r', '\n'][..]) {
            // several lines at once; the caller did its own splitting
            return Ok(None);
        }

        let tags_len = match line.strip_prefix('@') {
            Some(rest) => rest.find(' ').map(|i| i + 2).unwrap_or(line.len()),
            None => 0,
        };
        let body_len = line.len() - tags_len + 2 + relay_overhead(origin);
        Ok(measure(tags_len, body_len, 0))
    }
}

impl IrcEncode for String {
    fn encode_relayed(
        &self,
        buf: &mut Vec<u8>,
        origin: &Prefix,
    ) -> Result<Option<EncodeWarning>, EncodeError> {
        self.as_str().encode_relayed(buf, origin)
    }
}

impl<T: IrcEncode + ?Sized> IrcEncode for &T {
    fn encode_relayed(
        &self,
        buf: &mut Vec<u8>,
        origin: &Prefix,
    ) -> Result<Option<EncodeWarning>, EncodeError> {
        (**self).encode_relayed(buf, origin)
    }
}
