use crate::command::Command;
use crate::error::UnsupportedCommand;
use crate::message::params::Params;
use crate::message::tags::Tags;
use crate::prefix::Prefix;

/// CTCP framing byte.
pub(crate) const CTCP_DELIM: char = '\x01';

/// An owned IRC message.
///
/// Decoded messages carry their source and will write it back out when
/// re-encoded. Constructed messages leave the source out, because servers
/// discard client lines whose prefix is anything but the sender's nickname.
///
/// # Example
///
/// ```
/// use slirc_conn::{Command, Message};
///
/// let msg: Message = ":WiZ PART #foo :leaving now".parse().unwrap();
/// assert_eq!(msg.source.nick, "WiZ");
/// assert_eq!(msg.command, Command::PART);
/// assert_eq!(msg.params.get(2), "leaving now");
///
/// let out = Message::privmsg("#channel", "Hello!");
/// assert_eq!(out.to_string(), "PRIVMSG #channel :Hello!\r\n");
/// ```
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// IRCv3 message tags.
    pub tags: Tags,
    /// Message source; all-empty when the line had no prefix.
    pub source: Prefix,
    /// The command verb or numeric, upper-case.
    pub command: Command,
    /// Command parameters, trailing parameter included.
    pub params: Params,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) include_source: bool,
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.tags == other.tags
            && self.source == other.source
            && self.command == other.command
            && self.params == other.params
    }
}

impl Eq for Message {}

impl Message {
    /// Create an outgoing message from a command and its parameters.
    ///
    /// Only the last parameter may contain spaces.
    pub fn new<C, I, S>(command: C, params: I) -> Self
    where
        C: Into<Command>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Message {
            command: command.into(),
            params: params.into_iter().collect(),
            ..Default::default()
        }
    }

    fn from_parts(command: Command, params: Vec<String>) -> Self {
        Message {
            command,
            params: Params::from(params),
            ..Default::default()
        }
    }

    /// Add or replace a tag.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.set(key, value);
        self
    }

    /// Set the source and include it when encoding.
    #[must_use]
    pub fn with_source(mut self, source: Prefix) -> Self {
        self.source = source;
        self.include_source = true;
        self
    }

    /// Whether the source is written when encoding.
    pub fn includes_source(&self) -> bool {
        self.include_source
    }

    /// Control whether the source is written when encoding.
    ///
    /// Set for decoded messages, clear for constructed ones. Middleware that
    /// forwards a copy of a message may need to set it explicitly.
    pub fn set_include_source(&mut self, include: bool) {
        self.include_source = include;
    }

    /// The free-form text of the well-known commands.
    ///
    /// PART and KICK yield their reason. For unsupported commands the error
    /// is returned and the caller should read [`params`](Message::params).
    pub fn text(&self) -> Result<&str, UnsupportedCommand> {
        let c = &self.command;
        if *c == Command::QUIT || *c == Command::ERROR {
            Ok(self.params.get(1))
        } else if *c == Command::KICK {
            Ok(self.params.get(3))
        } else if [
            Command::PRIVMSG,
            Command::NOTICE,
            Command::CTCP_ACTION,
            Command::TOPIC,
            Command::PART,
            Command::MODE,
        ]
        .contains(c)
        {
            Ok(self.params.get(2))
        } else {
            Err(self.unsupported("text"))
        }
    }

    /// The target: a channel, or our own nickname for private messages.
    pub fn target(&self) -> Result<&str, UnsupportedCommand> {
        if [
            Command::PRIVMSG,
            Command::NOTICE,
            Command::CTCP_ACTION,
            Command::INVITE,
            Command::TOPIC,
            Command::KICK,
            Command::PART,
            Command::MODE,
        ]
        .contains(&self.command)
        {
            Ok(self.params.get(1))
        } else {
            Err(self.unsupported("target"))
        }
    }

    /// The channel the message applies to.
    pub fn channel(&self) -> Result<&str, UnsupportedCommand> {
        if self.command == Command::INVITE {
            Ok(self.params.get(2))
        } else if [
            Command::PRIVMSG,
            Command::NOTICE,
            Command::CTCP_ACTION,
            Command::JOIN,
            Command::TOPIC,
            Command::KICK,
            Command::PART,
        ]
        .contains(&self.command)
        {
            Ok(self.params.get(1))
        } else {
            Err(self.unsupported("channel"))
        }
    }

    fn unsupported(&self, accessor: &'static str) -> UnsupportedCommand {
        UnsupportedCommand {
            command: self.command.to_string(),
            accessor,
        }
    }

    /// PRIVMSG to a channel or nickname.
    #[must_use]
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Message::from_parts(Command::PRIVMSG, vec![target.into(), text.into()])
    }

    /// NOTICE to a channel or nickname.
    #[must_use]
    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Self {
        Message::from_parts(Command::NOTICE, vec![target.into(), text.into()])
    }

    /// A CTCP query, framed inside a PRIVMSG.
    #[must_use]
    pub fn ctcp(target: impl Into<String>, sub: &str, text: &str) -> Self {
        Message::privmsg(target, ctcp_body(sub, text))
    }

    /// A CTCP reply, framed inside a NOTICE.
    #[must_use]
    pub fn ctcp_reply(target: impl Into<String>, sub: &str, text: &str) -> Self {
        Message::notice(target, ctcp_body(sub, text))
    }

    /// A CTCP ACTION, the `/me` command.
    #[must_use]
    pub fn describe(target: impl Into<String>, action: &str) -> Self {
        Message::ctcp(target, "ACTION", action)
    }

    /// TAGMSG carrying only tags.
    #[must_use]
    pub fn tagmsg(target: impl Into<String>) -> Self {
        Message::from_parts(Command::TAGMSG, vec![target.into()])
    }

    /// Change nickname.
    #[must_use]
    pub fn nick(nickname: impl Into<String>) -> Self {
        Message::from_parts(Command::NICK, vec![nickname.into()])
    }

    /// Join a channel.
    #[must_use]
    pub fn join(channel: impl Into<String>) -> Self {
        Message::from_parts(Command::JOIN, vec![channel.into()])
    }

    /// Join a channel that requires a key.
    #[must_use]
    pub fn join_with_key(channel: impl Into<String>, key: impl Into<String>) -> Self {
        Message::from_parts(Command::JOIN, vec![channel.into(), key.into()])
    }

    /// Leave a channel.
    #[must_use]
    pub fn part(channel: impl Into<String>) -> Self {
        Message::from_parts(Command::PART, vec![channel.into()])
    }

    /// Leave a channel with a reason.
    #[must_use]
    pub fn part_with_reason(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        Message::from_parts(Command::PART, vec![channel.into(), reason.into()])
    }

    /// Leave every channel (`JOIN 0`).
    #[must_use]
    pub fn part_all() -> Self {
        Message::join("0")
    }

    /// End the session.
    #[must_use]
    pub fn quit(reason: impl Into<String>) -> Self {
        Message::from_parts(Command::QUIT, vec![reason.into()])
    }

    /// Kick a user from a channel.
    #[must_use]
    pub fn kick(channel: impl Into<String>, nick: impl Into<String>) -> Self {
        Message::from_parts(Command::KICK, vec![channel.into(), nick.into()])
    }

    /// Kick a user from a channel with a reason.
    #[must_use]
    pub fn kick_with_reason(
        channel: impl Into<String>,
        nick: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Message::from_parts(Command::KICK, vec![channel.into(), nick.into(), reason.into()])
    }

    /// Change a mode, e.g. `mode("#foo", "+o", "bob")`.
    #[must_use]
    pub fn mode(
        target: impl Into<String>,
        flags: impl Into<String>,
        arg: impl Into<String>,
    ) -> Self {
        Message::from_parts(Command::MODE, vec![target.into(), flags.into(), arg.into()])
    }

    /// Query the modes of a channel or user.
    #[must_use]
    pub fn mode_query(target: impl Into<String>) -> Self {
        Message::from_parts(Command::MODE, vec![target.into()])
    }

    /// Invite `nick` to `channel`.
    #[must_use]
    pub fn invite(nick: impl Into<String>, channel: impl Into<String>) -> Self {
        Message::from_parts(Command::INVITE, vec![nick.into(), channel.into()])
    }

    /// Set a channel topic.
    #[must_use]
    pub fn topic(channel: impl Into<String>, topic: impl Into<String>) -> Self {
        Message::from_parts(Command::TOPIC, vec![channel.into(), topic.into()])
    }

    /// Server PING with a token the server will echo.
    #[must_use]
    pub fn ping(token: impl Into<String>) -> Self {
        Message::from_parts(Command::PING, vec![token.into()])
    }

    /// Reply to a server PING.
    #[must_use]
    pub fn pong(token: impl Into<String>) -> Self {
        Message::from_parts(Command::PONG, vec![token.into()])
    }

    /// Register username and realname: `USER <user> 0 * :<realname>`.
    #[must_use]
    pub fn user(username: impl Into<String>, realname: impl Into<String>) -> Self {
        Message::from_parts(
            Command::USER,
            vec![username.into(), "0".into(), "*".into(), realname.into()],
        )
    }

    /// Connection password.
    #[must_use]
    pub fn pass(password: impl Into<String>) -> Self {
        Message::from_parts(Command::PASS, vec![password.into()])
    }

    /// A CAP command; `args` starts with the subcommand.
    #[must_use]
    pub fn cap<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Message::new(Command::CAP, args)
    }

    /// Start capability negotiation at `version` (e.g. `"302"`).
    #[must_use]
    pub fn cap_ls(version: &str) -> Self {
        Message::cap(["LS", version])
    }

    /// Request one or more space-separated capabilities.
    #[must_use]
    pub fn cap_req(caps: &str) -> Self {
        Message::cap(["REQ", caps])
    }

    /// List the capabilities enabled on this connection.
    #[must_use]
    pub fn cap_list() -> Self {
        Message::cap(["LIST"])
    }

    /// Finish capability negotiation.
    #[must_use]
    pub fn cap_end() -> Self {
        Message::cap(["END"])
    }
}

fn ctcp_body(sub: &str, text: &str) -> String {
    if text.is_empty() {
        format!("{d}{}{d}", sub, d = CTCP_DELIM)
    } else {
        format!("{d}{} {}{d}", sub, text, d = CTCP_DELIM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let user = Message::user("guest", "Real Name");
        assert_eq!(user.command, Command::USER);
        assert_eq!(user.params.as_slice(), ["guest", "0", "*", "Real Name"]);

        let ctcp = Message::describe("#foo", "waves");
        assert_eq!(ctcp.params.get(2), "\x01ACTION waves\x01");

        let version = Message::ctcp("bob", "VERSION", "");
        assert_eq!(version.params.get(2), "\x01VERSION\x01");

        assert_eq!(Message::cap_ls("302").params.as_slice(), ["LS", "302"]);
        assert!(!Message::pong("x").includes_source());
    }

    #[test]
    fn test_text_accessors() {
        let msg = Message::privmsg("#chan", "hi there");
        assert_eq!(msg.text(), Ok("hi there"));
        assert_eq!(msg.target(), Ok("#chan"));
        assert_eq!(msg.channel(), Ok("#chan"));

        let kick = Message::kick_with_reason("#chan", "bob", "bye");
        assert_eq!(kick.text(), Ok("bye"));

        let invite = Message::invite("bob", "#chan");
        assert_eq!(invite.channel(), Ok("#chan"));

        let err = Message::ping("x").text().unwrap_err();
        assert_eq!(err.command, "PING");
        assert_eq!(err.accessor, "text");
    }

    #[test]
    fn test_equality_ignores_include_source() {
        let a = Message::privmsg("#a", "b");
        let mut b = a.clone();
        b.set_include_source(true);
        assert_eq!(a, b);
    }
}
