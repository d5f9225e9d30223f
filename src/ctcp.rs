//! CTCP (Client-to-Client Protocol) framing.
//!
//! CTCP messages ride inside PRIVMSG (queries) and NOTICE (replies) bodies,
//! wrapped in `\x01` bytes.
//!
//! # Reference
//! - CTCP specification: <https://modern.ircdocs.horse/ctcp.html>
//!
//! # Example
//!
//! ```
//! use slirc_conn::ctcp::Ctcp;
//!
//! let ctcp = Ctcp::parse("\x01ACTION waves hello\x01").unwrap();
//! assert_eq!(ctcp.sub, "ACTION");
//! assert_eq!(ctcp.text, "waves hello");
//! ```

use crate::message::CTCP_DELIM;

/// A CTCP payload split into its subcommand and text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// Subcommand as sent, e.g. `ACTION` or `VERSION`.
    pub sub: &'a str,
    /// Everything after the subcommand and its separating space.
    pub text: &'a str,
}

impl<'a> Ctcp<'a> {
    /// Parse a PRIVMSG/NOTICE body.
    ///
    /// The body must start with `\x01` and carry a non-empty subcommand
    /// directly after it. The closing `\x01` is optional, since some clients
    /// omit it.
    ///
    /// ```
    /// use slirc_conn::ctcp::Ctcp;
    ///
    /// let ctcp = Ctcp::parse("\x01VERSION\x01").unwrap();
    /// assert_eq!(ctcp.sub, "VERSION");
    /// assert_eq!(ctcp.text, "");
    /// assert!(Ctcp::parse("\x01\x01").is_none());
    /// ```
    pub fn parse(body: &'a str) -> Option<Self> {
        let rest = body.strip_prefix(CTCP_DELIM)?;
        let sub_end = rest.find(&[' ', CTCP_DELIM][..]).unwrap_or(rest.len());
        if sub_end == 0 {
            return None;
        }

        let (sub, rest) = rest.split_at(sub_end);
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        let text = rest.strip_suffix(CTCP_DELIM).unwrap_or(rest);
        Some(Ctcp { sub, text })
    }

    /// Check whether a message body is CTCP framed.
    #[inline]
    pub fn is_ctcp(body: &str) -> bool {
        body.starts_with(CTCP_DELIM)
    }
}
