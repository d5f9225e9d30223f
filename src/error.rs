//! Error types for the IRC client library.
//!
//! Lexical errors and encode failures are per-line conditions that the
//! connection recovers from. [`ClientError`] is the single terminal outcome
//! of a connection run.

use std::fmt;

use thiserror::Error;

use crate::prefix::Prefix;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Protocol-level errors raised while framing or decoding inbound lines.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the configured maximum and was discarded.
    #[error("message too long: {actual} bytes (limit {limit})")]
    MessageTooLong {
        /// Bytes seen before the line was discarded.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Failed to parse an IRC message.
    #[error("invalid message {string:?}: {cause}")]
    InvalidMessage {
        /// The raw message string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Lexical errors produced while scanning a single line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The scanner rejected the input at `position` (byte offset).
    #[error("parsing failed at position {position}: {reason}")]
    Lexical {
        /// Byte offset of the offending character, or the input length at EOF.
        position: usize,
        /// Human-readable diagnostic.
        reason: String,
    },
}

impl MessageParseError {
    pub(crate) fn lexical(position: usize, reason: impl Into<String>) -> Self {
        MessageParseError::Lexical {
            position,
            reason: reason.into(),
        }
    }

    /// Byte offset at which scanning stopped.
    pub fn position(&self) -> usize {
        match self {
            MessageParseError::Lexical { position, .. } => *position,
        }
    }
}

/// Hard encode failures. A message that fails to encode is never sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    /// The command field is empty.
    #[error("cannot encode a message without a command")]
    EmptyCommand,

    /// A field contains a byte that would break line framing.
    #[error("illegal character {ch:?} in {field}")]
    IllegalChar {
        /// Which field held the character.
        field: &'static str,
        /// The offending character.
        ch: char,
    },

    /// A tag key is empty or uses characters outside the key alphabet.
    #[error("invalid tag key {0:?}")]
    InvalidTagKey(String),

    /// A non-final parameter cannot be represented on the wire.
    #[error("parameter {index} cannot be a middle parameter: {value:?}")]
    InvalidMiddleParam {
        /// 1-based ordinal of the parameter.
        index: usize,
        /// The parameter value.
        value: String,
    },

    /// The source would read back as a different prefix.
    #[error("source {0:?} cannot be written unambiguously")]
    AmbiguousSource(Prefix),
}

/// An accessor was called on a command it does not know the layout of.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{command}: {accessor} is not supported for this command")]
pub struct UnsupportedCommand {
    /// The message's command.
    pub command: String,
    /// The accessor that was called.
    pub accessor: &'static str,
}

/// Soft limit violations found while encoding.
///
/// The encoded bytes are still valid and still sent; the warning exists so
/// callers can see that a server may truncate or reject the line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeWarning {
    /// Tag section length in bytes, when over the limit.
    pub tags_len: Option<usize>,
    /// Body length in bytes (including the relayed prefix estimate), when over the limit.
    pub body_len: Option<usize>,
    /// Parameter count, when over the limit.
    pub params: Option<usize>,
}

impl EncodeWarning {
    /// True when no limit was exceeded.
    pub fn is_empty(&self) -> bool {
        self.tags_len.is_none() && self.body_len.is_none() && self.params.is_none()
    }

    pub(crate) fn into_option(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Display for EncodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if let Some(n) = self.tags_len {
            parts.push(format!(
                "tags are {} bytes (limit {})",
                n,
                crate::util::MAX_TAGS_LENGTH
            ));
        }
        if let Some(n) = self.body_len {
            parts.push(format!(
                "message is {} bytes (limit {})",
                n,
                crate::util::MAX_MESSAGE_BODY
            ));
        }
        if let Some(n) = self.params {
            parts.push(format!(
                "{} parameters (limit {})",
                n,
                crate::util::MAX_PARAMS
            ));
        }
        write!(f, "message may be truncated: {}", parts.join(", "))
    }
}

impl std::error::Error for EncodeWarning {}

/// The terminal outcome of a connection run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// No nickname was configured.
    #[error("a nickname is required")]
    MissingNickname,

    /// Neither an address nor a custom dialer was configured.
    #[error("an address or a dialer is required")]
    MissingAddress,

    /// `run` was called while another run on the same client is active.
    #[error("client is already connected")]
    AlreadyConnected,

    /// A liveness probe went unanswered.
    #[error("ping timeout")]
    PingTimeout,

    /// The remote end closed the stream.
    #[error("connection closed by remote host")]
    ConnectionClosed,

    /// The read task ended without reporting why.
    #[error("reader stopped unexpectedly")]
    ReaderStopped,

    /// Transport failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Framing failure on the read path.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
