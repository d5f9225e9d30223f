//! IRC command verbs.
//!
//! A [`Command`] is the verb (or three-digit numeric) of a message. The wire
//! form is case-insensitive; the stored form is always upper-case, so derived
//! equality and hashing already fold case.

use std::borrow::{Borrow, Cow};
use std::fmt;

const CTCP_QUERY_PREFIX: &str = "_CTCP_QUERY_";
const CTCP_REPLY_PREFIX: &str = "_CTCP_REPLY_";

/// An IRC command verb or numeric reply code.
///
/// ```
/// use slirc_conn::Command;
///
/// let cmd = Command::new("privmsg");
/// assert_eq!(cmd, Command::PRIVMSG);
/// assert!(cmd.is("PrivMsg"));
/// assert_eq!(cmd.as_str(), "PRIVMSG");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub struct Command(Cow<'static, str>);

macro_rules! commands {
    ($($(#[$doc:meta])* $name:ident => $wire:literal,)*) => {
        impl Command {
            $(
                $(#[$doc])*
                pub const $name: Command = Command(Cow::Borrowed($wire));
            )*
        }
    };
}

commands! {
    /// Get information about the administrator of a server.
    ADMIN => "ADMIN",
    /// Set or clear an away message.
    AWAY => "AWAY",
    /// IRCv3 capability negotiation.
    CAP => "CAP",
    /// Report a fatal error to a peer.
    ERROR => "ERROR",
    /// Invite a user to a channel.
    INVITE => "INVITE",
    /// Check whether nicknames are online.
    ISON => "ISON",
    /// Join a channel.
    JOIN => "JOIN",
    /// Forcibly remove a user from a channel.
    KICK => "KICK",
    /// List channels and their topics.
    LIST => "LIST",
    /// Query or change a mode.
    MODE => "MODE",
    /// Get the message of the day.
    MOTD => "MOTD",
    /// List visible nicknames.
    NAMES => "NAMES",
    /// Set or change a nickname.
    NICK => "NICK",
    /// Send a notice.
    NOTICE => "NOTICE",
    /// Obtain operator privileges.
    OPER => "OPER",
    /// Leave a channel.
    PART => "PART",
    /// Set a connection password.
    PASS => "PASS",
    /// Liveness check.
    PING => "PING",
    /// Reply to a PING.
    PONG => "PONG",
    /// Send a private or channel message.
    PRIVMSG => "PRIVMSG",
    /// Terminate the session.
    QUIT => "QUIT",
    /// Message carrying only tags.
    TAGMSG => "TAGMSG",
    /// Get the server's local time.
    TIME => "TIME",
    /// Query or change a channel topic.
    TOPIC => "TOPIC",
    /// Register username and realname.
    USER => "USER",
    /// Look up user host information.
    USERHOST => "USERHOST",
    /// Get the server version.
    VERSION => "VERSION",
    /// Message to all users with the `w` mode.
    WALLOPS => "WALLOPS",
    /// List users matching a mask.
    WHO => "WHO",
    /// Get information about a user.
    WHOIS => "WHOIS",
    /// Get information about a nickname that no longer exists.
    WHOWAS => "WHOWAS",

    /// CTCP ACTION query (`/me`).
    CTCP_ACTION => "_CTCP_QUERY_ACTION",
    /// CTCP CLIENTINFO query.
    CTCP_CLIENTINFO => "_CTCP_QUERY_CLIENTINFO",
    /// CTCP DCC query.
    CTCP_DCC => "_CTCP_QUERY_DCC",
    /// CTCP PING query.
    CTCP_PING => "_CTCP_QUERY_PING",
    /// CTCP SOURCE query.
    CTCP_SOURCE => "_CTCP_QUERY_SOURCE",
    /// CTCP TIME query.
    CTCP_TIME => "_CTCP_QUERY_TIME",
    /// CTCP VERSION query.
    CTCP_VERSION => "_CTCP_QUERY_VERSION",
    /// CTCP CLIENTINFO reply.
    CTCP_CLIENTINFO_REPLY => "_CTCP_REPLY_CLIENTINFO",
    /// CTCP PING reply.
    CTCP_PING_REPLY => "_CTCP_REPLY_PING",
    /// CTCP SOURCE reply.
    CTCP_SOURCE_REPLY => "_CTCP_REPLY_SOURCE",
    /// CTCP TIME reply.
    CTCP_TIME_REPLY => "_CTCP_REPLY_TIME",
    /// CTCP VERSION reply.
    CTCP_VERSION_REPLY => "_CTCP_REPLY_VERSION",
}

impl Command {
    /// Create a command, folding it to upper-case.
    pub fn new(verb: impl Into<String>) -> Self {
        let mut verb = verb.into();
        verb.make_ascii_uppercase();
        Command(Cow::Owned(verb))
    }

    /// The pseudo-command for an inbound CTCP query (`PRIVMSG` framing).
    ///
    /// ```
    /// use slirc_conn::Command;
    /// assert_eq!(Command::ctcp_query("action"), Command::CTCP_ACTION);
    /// ```
    pub fn ctcp_query(sub: &str) -> Self {
        Command::new(format!("{}{}", CTCP_QUERY_PREFIX, sub))
    }

    /// The pseudo-command for an inbound CTCP reply (`NOTICE` framing).
    pub fn ctcp_reply(sub: &str) -> Self {
        Command::new(format!("{}{}", CTCP_REPLY_PREFIX, sub))
    }

    /// The canonical upper-case form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a wire verb.
    pub fn is(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }

    /// True for an empty command, which cannot be encoded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The numeric value for three-digit reply codes.
    pub fn numeric(&self) -> Option<u16> {
        let b = self.0.as_bytes();
        if b.len() == 3 && b.iter().all(u8::is_ascii_digit) {
            self.0.parse().ok()
        } else {
            None
        }
    }

    /// The CTCP subcommand if this is a query pseudo-command.
    pub fn ctcp_query_sub(&self) -> Option<&str> {
        self.0.strip_prefix(CTCP_QUERY_PREFIX)
    }

    /// The CTCP subcommand if this is a reply pseudo-command.
    pub fn ctcp_reply_sub(&self) -> Option<&str> {
        self.0.strip_prefix(CTCP_REPLY_PREFIX)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({})", self.0)
    }
}

impl AsRef<str> for Command {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Command {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        Command::new(s)
    }
}

impl From<String> for Command {
    fn from(s: String) -> Self {
        Command::new(s)
    }
}

impl From<Command> for String {
    fn from(c: Command) -> Self {
        c.0.into_owned()
    }
}

impl PartialEq<str> for Command {
    fn eq(&self, other: &str) -> bool {
        self.is(other)
    }
}

impl PartialEq<&str> for Command {
    fn eq(&self, other: &&str) -> bool {
        self.is(other)
    }
}
