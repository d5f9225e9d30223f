//! Protocol limits shared by the encoder and the line reader.

/// Maximum length for the tag section, counting the leading `@` and the
/// space that ends the section.
pub const MAX_TAGS_LENGTH: usize = 4096;

/// Maximum length for the message body (everything after the tags),
/// including the trailing CRLF.
pub const MAX_MESSAGE_BODY: usize = 512;

/// Maximum number of parameters a message may carry.
pub const MAX_PARAMS: usize = 15;

/// Longest inbound line accepted from a server: server tag data (8191)
/// plus a full body.
pub const MAX_INBOUND_LINE: usize = 8191 + MAX_MESSAGE_BODY;

/// Returns `Some(len)` if a tag section of `len` bytes exceeds the limit.
#[inline]
pub fn check_tags_length(len: usize) -> Option<usize> {
    if len > MAX_TAGS_LENGTH {
        Some(len)
    } else {
        None
    }
}

/// Returns `Some(len)` if a body of `len` bytes exceeds the limit.
#[inline]
pub fn check_body_length(len: usize) -> Option<usize> {
    if len > MAX_MESSAGE_BODY {
        Some(len)
    } else {
        None
    }
}

/// Returns `Some(count)` if `count` parameters exceed the limit.
#[inline]
pub fn check_param_count(count: usize) -> Option<usize> {
    if count > MAX_PARAMS {
        Some(count)
    } else {
        None
    }
}
