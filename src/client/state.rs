//! Minimal per-connection state.
//!
//! Only what framing needs is tracked: our own `nick!user@host` (for the
//! relayed-prefix length budget and for recognising our own NICK changes),
//! the server name (the source of prefix-less lines), the lifecycle status,
//! and the enabled capabilities.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::casemap::irc_eq;
use crate::command::Command;
use crate::handler::{BoxHandler, Handler, MessageWriter};
use crate::message::Message;
use crate::prefix::Prefix;
use crate::response::Response;

/// Lifecycle of one connection run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// No run is active.
    #[default]
    Disconnected,
    /// Dialing or registering.
    Connecting,
    /// Registration was sent.
    Connected,
    /// A QUIT was written; a remote close is expected.
    Disconnecting,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Disconnected => "disconnected",
            Status::Connecting => "connecting",
            Status::Connected => "connected",
            Status::Disconnecting => "disconnecting",
        })
    }
}

/// What the client knows about itself and the server.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionState {
    /// Our current nickname.
    pub nick: String,
    /// Our user name as the server sees it (may carry a `~`).
    pub user: String,
    /// Our host as the server sees it.
    pub host: String,
    /// Name of the server we are connected to.
    pub server: String,
    /// Connection lifecycle.
    pub status: Status,
    /// Capabilities the server acknowledged.
    pub caps: BTreeSet<String>,
}

impl ConnectionState {
    /// Our prefix as other clients will see it.
    pub fn prefix(&self) -> Prefix {
        Prefix::new(self.nick.as_str(), self.user.as_str(), self.host.as_str())
    }

    /// True if `cap` was acknowledged and not since removed.
    pub fn has_cap(&self, cap: &str) -> bool {
        self.caps.contains(cap)
    }

    /// Update from one inbound message.
    pub(crate) fn observe(&mut self, msg: &Message) {
        if msg.command == Response::RPL_WELCOME {
            // "Welcome to the Internet Relay Network <nick>!<user>@<host>"
            // Servers vary too much to trust anything but a full mask here.
            let last = msg.params.get(2).split_whitespace().last().unwrap_or("");
            if let Some((nick, user, host)) = split_full_mask(last) {
                self.nick = nick.to_owned();
                self.user = user.to_owned();
                self.host = host.to_owned();
            }
        } else if msg.command == Response::RPL_MYINFO {
            // fewer than three params means a non-conforming server; fall
            // back to the line's source
            if msg.params.len() > 2 {
                self.server = msg.params.get(2).to_owned();
            } else {
                self.server = msg.source.host.clone();
            }
        } else if msg.command == Response::RPL_HOSTHIDDEN {
            // "<target> <host> :is now your displayed host"
            if msg.params.len() > 1 {
                self.host = msg.params.get(2).to_owned();
            }
        } else if msg.command == Command::NICK {
            if irc_eq(&msg.source.nick, &self.nick) {
                self.nick = msg.params.get(1).to_owned();
            }
        } else if msg.command == Command::CAP {
            self.observe_cap(msg);
        }
    }

    fn observe_cap(&mut self, msg: &Message) {
        let sub = msg.params.get(2);
        let caps = msg.params.last().split_ascii_whitespace();
        if sub.eq_ignore_ascii_case("ACK") {
            for cap in caps {
                match cap.strip_prefix('-') {
                    Some(removed) => {
                        self.caps.remove(removed);
                    }
                    None => {
                        self.caps.insert(cap.to_owned());
                    }
                }
            }
        } else if sub.eq_ignore_ascii_case("DEL") {
            for cap in caps {
                self.caps.remove(cap);
            }
        }
    }
}

/// Split `nick!user@host`. The user is the shortest run before an `@`, and
/// the host may be empty.
fn split_full_mask(mask: &str) -> Option<(&str, &str, &str)> {
    let (nick, rest) = mask.split_once('!')?;
    if nick.is_empty() || nick.contains('@') {
        return None;
    }
    let (user, host) = rest.split_once('@')?;
    if user.is_empty() {
        return None;
    }
    Some((nick, user, host))
}

/// Middleware keeping a shared [`ConnectionState`] current. Every message is
/// forwarded unchanged.
pub(crate) fn tracker(state: Arc<RwLock<ConnectionState>>, next: BoxHandler) -> BoxHandler {
    Box::new(StateTracker { state, next })
}

struct StateTracker {
    state: Arc<RwLock<ConnectionState>>,
    next: BoxHandler,
}

#[async_trait]
impl Handler for StateTracker {
    async fn handle(&self, writer: &dyn MessageWriter, msg: &mut Message) {
        self.state.write().observe(msg);
        self.next.handle(writer, msg).await
    }
}
