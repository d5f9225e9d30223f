//! IRC numeric reply codes.
//!
//! Only the replies a client commonly dispatches on are named here; any
//! other numeric still decodes as a plain [`Command`].
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>

#![allow(non_camel_case_types)]

use std::fmt;

use crate::command::Command;

macro_rules! responses {
    ($($(#[$doc:meta])* $name:ident = $code:literal,)*) => {
        /// IRC server response code.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u16)]
        #[non_exhaustive]
        pub enum Response {
            $($(#[$doc])* $name = $code,)*
        }

        impl Response {
            /// Look up a named response by numeric value.
            pub fn from_code(code: u16) -> Option<Response> {
                match code {
                    $($code => Some(Response::$name),)*
                    _ => None,
                }
            }
        }
    };
}

responses! {
    /// 001 - Welcome, carries `nick!user@host` in its text.
    RPL_WELCOME = 1,
    /// 002 - Your host is running version.
    RPL_YOURHOST = 2,
    /// 003 - Server creation date.
    RPL_CREATED = 3,
    /// 004 - Server name, version and supported modes.
    RPL_MYINFO = 4,
    /// 005 - Supported features.
    RPL_ISUPPORT = 5,
    /// 010 - Bounce to another server.
    RPL_BOUNCE = 10,
    /// 221 - Current user modes.
    RPL_UMODEIS = 221,
    /// 301 - Target is away.
    RPL_AWAY = 301,
    /// 305 - No longer away.
    RPL_UNAWAY = 305,
    /// 306 - Marked as away.
    RPL_NOWAWAY = 306,
    /// 311 - WHOIS user line.
    RPL_WHOISUSER = 311,
    /// 315 - End of WHO.
    RPL_ENDOFWHO = 315,
    /// 318 - End of WHOIS.
    RPL_ENDOFWHOIS = 318,
    /// 324 - Channel modes.
    RPL_CHANNELMODEIS = 324,
    /// 331 - No topic set.
    RPL_NOTOPIC = 331,
    /// 332 - Channel topic.
    RPL_TOPIC = 332,
    /// 341 - Invite sent.
    RPL_INVITING = 341,
    /// 352 - WHO reply.
    RPL_WHOREPLY = 352,
    /// 353 - NAMES reply.
    RPL_NAMREPLY = 353,
    /// 366 - End of NAMES.
    RPL_ENDOFNAMES = 366,
    /// 372 - MOTD line.
    RPL_MOTD = 372,
    /// 375 - Start of MOTD.
    RPL_MOTDSTART = 375,
    /// 376 - End of MOTD.
    RPL_ENDOFMOTD = 376,
    /// 396 - Visible host changed.
    RPL_HOSTHIDDEN = 396,
    /// 401 - No such nick or channel.
    ERR_NOSUCHNICK = 401,
    /// 403 - No such channel.
    ERR_NOSUCHCHANNEL = 403,
    /// 404 - Cannot send to channel.
    ERR_CANNOTSENDTOCHAN = 404,
    /// 421 - Unknown command.
    ERR_UNKNOWNCOMMAND = 421,
    /// 422 - MOTD file missing.
    ERR_NOMOTD = 422,
    /// 431 - No nickname given.
    ERR_NONICKNAMEGIVEN = 431,
    /// 432 - Erroneous nickname.
    ERR_ERRONEUSNICKNAME = 432,
    /// 433 - Nickname in use.
    ERR_NICKNAMEINUSE = 433,
    /// 451 - Not registered.
    ERR_NOTREGISTERED = 451,
    /// 461 - Not enough parameters.
    ERR_NEEDMOREPARAMS = 461,
    /// 462 - Already registered.
    ERR_ALREADYREGISTERED = 462,
    /// 464 - Password mismatch.
    ERR_PASSWDMISMATCH = 464,
    /// 465 - Banned from server.
    ERR_YOUREBANNEDCREEP = 465,
    /// 471 - Channel is full.
    ERR_CHANNELISFULL = 471,
    /// 473 - Invite only channel.
    ERR_INVITEONLYCHAN = 473,
    /// 474 - Banned from channel.
    ERR_BANNEDFROMCHAN = 474,
    /// 475 - Bad channel key.
    ERR_BADCHANNELKEY = 475,
    /// 482 - Not a channel operator.
    ERR_CHANOPRIVSNEEDED = 482,
    /// 900 - Logged in as account.
    RPL_LOGGEDIN = 900,
    /// 903 - SASL authentication succeeded.
    RPL_SASLSUCCESS = 903,
    /// 904 - SASL authentication failed.
    ERR_SASLFAIL = 904,
}

impl Response {
    /// Returns the numeric code as u16.
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is an error reply (4xx, 5xx or a SASL failure).
    #[inline]
    pub fn is_error(&self) -> bool {
        let code = self.code();
        (400..600).contains(&code) || (902..=907).contains(&code)
    }

    /// The three-digit command used on the wire.
    pub fn as_command(&self) -> Command {
        Command::new(self.to_string())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

impl PartialEq<Response> for Command {
    fn eq(&self, other: &Response) -> bool {
        self.numeric() == Some(other.code())
    }
}

impl From<Response> for Command {
    fn from(r: Response) -> Self {
        r.as_command()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_zero_padded() {
        assert_eq!(Response::RPL_WELCOME.to_string(), "001");
        assert_eq!(Response::RPL_HOSTHIDDEN.to_string(), "396");
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Response::from_code(4), Some(Response::RPL_MYINFO));
        assert_eq!(Response::from_code(999), None);
    }

    #[test]
    fn test_command_comparison() {
        assert!(Command::new("001") == Response::RPL_WELCOME);
        assert!(Command::new("004") != Response::RPL_WELCOME);
        assert!(Command::PRIVMSG != Response::RPL_WELCOME);
        assert!(Response::ERR_NICKNAMEINUSE.is_error());
        assert!(!Response::RPL_TOPIC.is_error());
    }
}
