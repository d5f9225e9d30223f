//! IRC message prefix (source).
//!
//! A prefix names the origin of a message: a server (`irc.example.com`), a
//! bare nickname (`WiZ`), or a full address (`WiZ!jto@tolsun.oulu.fi`).
//!
//! # Reference
//! - RFC 1459 Section 2.3.1: Message format

use std::fmt;

use crate::casemap::irc_eq;

/// The origin of a message as a `(nick, user, host)` triple.
///
/// All fields empty means the message carried no prefix. A prefix with a
/// host and no nickname denotes a server.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prefix {
    /// Nickname, empty for server prefixes.
    pub nick: String,
    /// Username (ident), empty unless the prefix was a full address.
    pub user: String,
    /// Host or server name.
    pub host: String,
}

impl Prefix {
    /// Create a prefix from its three parts.
    pub fn new(
        nick: impl Into<String>,
        user: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Prefix {
            nick: nick.into(),
            user: user.into(),
            host: host.into(),
        }
    }

    /// A server prefix.
    pub fn server(host: impl Into<String>) -> Self {
        Prefix {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Parse a prefix without its leading `:`.
    ///
    /// This is lenient: it never fails, but otherwise splits the string the
    /// way prefixes are read off the wire. The nickname runs up to the first
    /// `!` and a `.` inside it marks the whole string as a server name. The
    /// user then runs up to the first `@`.
    ///
    /// ```
    /// use slirc_conn::Prefix;
    ///
    /// let p = Prefix::parse("WiZ!jto@tolsun.oulu.fi");
    /// assert_eq!(p, Prefix::new("WiZ", "jto", "tolsun.oulu.fi"));
    /// assert!(Prefix::parse("irc.example.com").is_server());
    /// ```
    pub fn parse(s: &str) -> Self {
        let (nick, address) = match s.split_once('!') {
            Some((nick, address)) => (nick, Some(address)),
            None => (s, None),
        };
        if nick.contains('.') {
            return Prefix::server(s);
        }
        let (user, host) = address.map_or(("", ""), |a| a.split_once('@').unwrap_or((a, "")));
        Prefix::new(nick, user, host)
    }

    /// True when no part of the prefix is set.
    pub fn is_empty(&self) -> bool {
        self.nick.is_empty() && self.user.is_empty() && self.host.is_empty()
    }

    /// True when the prefix names a server rather than a user.
    pub fn is_server(&self) -> bool {
        !self.host.is_empty() && self.nick.is_empty()
    }

    /// Compare the nickname against `other` under RFC 1459 case mapping.
    pub fn nick_is(&self, other: &str) -> bool {
        irc_eq(&self.nick, other)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nick.is_empty() {
            return f.write_str(&self.host);
        }
        f.write_str(&self.nick)?;
        if !self.user.is_empty() || !self.host.is_empty() {
            write!(f, "!{}@{}", self.user, self.host)?;
        }
        Ok(())
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Prefix::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Prefix::default().to_string(), "");
        assert_eq!(Prefix::server("irc.example.com").to_string(), "irc.example.com");
        assert_eq!(Prefix::new("WiZ", "", "").to_string(), "WiZ");
        assert_eq!(
            Prefix::new("WiZ", "jto", "tolsun.oulu.fi").to_string(),
            "WiZ!jto@tolsun.oulu.fi"
        );
        assert_eq!(Prefix::new("WiZ", "", "host").to_string(), "WiZ!@host");
    }

    #[test]
    fn test_is_server() {
        assert!(Prefix::server("irc.example.com").is_server());
        assert!(!Prefix::new("nick", "user", "host").is_server());
        assert!(!Prefix::default().is_server());
        assert!(Prefix::default().is_empty());
    }

    #[test]
    fn test_parse() {
        assert_eq!(Prefix::parse("nick"), Prefix::new("nick", "", ""));
        assert_eq!(Prefix::parse("nick!@host"), Prefix::new("nick", "", "host"));
        assert_eq!(Prefix::parse("nick!user"), Prefix::new("nick", "user", ""));
        assert_eq!(
            Prefix::parse("nick!user@host.example"),
            Prefix::new("nick", "user", "host.example")
        );
        assert_eq!(Prefix::parse("irc.example.com"), Prefix::server("irc.example.com"));
    }

    #[test]
    fn test_parse_agrees_with_decoding() {
        for raw in [
            "nick@host",
            "nick@host.example",
            "a!b@c@d",
            "irc.example!x@y",
            "Bob!No.Habla!@bob.example",
        ] {
            let msg: crate::Message = format!(":{} PING x", raw).parse().unwrap();
            assert_eq!(Prefix::parse(raw), msg.source, "{}", raw);
        }
        assert_eq!(Prefix::parse("nick@host"), Prefix::new("nick@host", "", ""));
    }

    #[test]
    fn test_nick_is() {
        assert!(Prefix::new("Bob[away]", "", "").nick_is("bob{AWAY}"));
        assert!(!Prefix::server("irc.example.com").nick_is("irc.example.com"));
    }
}
