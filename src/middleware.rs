//! Built-in protocol middleware.
//!
//! Each constructor takes the next handler and returns the wrapped one, so
//! they can be used directly as [`Middleware`](crate::handler::Middleware).
//! The client installs them in this order, outermost first:
//!
//! 1. [`ctcp`]
//! 2. [`ping_reply`]
//! 3. the liveness reply matcher
//! 4. the connection state tracker
//! 5. [`cap_complete`]
//! 6. [`cap_request`], when capabilities were configured

use async_trait::async_trait;

use crate::command::Command;
use crate::ctcp::Ctcp;
use crate::handler::{BoxHandler, Handler, MessageWriter};
use crate::message::Message;

/// Rewrites CTCP-framed PRIVMSG and NOTICE lines.
///
/// A PRIVMSG whose body starts with `\x01` becomes `_CTCP_QUERY_<SUB>` and a
/// NOTICE becomes `_CTCP_REPLY_<SUB>`; the body is replaced by the CTCP text.
/// Must sit outside anything that distinguishes plain messages from CTCP.
pub fn ctcp(next: BoxHandler) -> BoxHandler {
    Box::new(CtcpReframe { next })
}

/// Answers server PINGs. PING lines are consumed, not forwarded.
pub fn ping_reply(next: BoxHandler) -> BoxHandler {
    Box::new(PingReply { next })
}

/// Completes capability negotiation after the final `CAP LS`/`CAP NEW` line
/// by writing `CAP LIST` and `CAP END`.
///
/// The next handler runs first, so anything further in that writes
/// `CAP REQ` does so before negotiation ends.
pub fn cap_complete(next: BoxHandler) -> BoxHandler {
    Box::new(CapComplete { next })
}

/// Requests the advertised subset of `wanted` on each `CAP LS`/`CAP NEW` line.
pub fn cap_request(wanted: Vec<String>, next: BoxHandler) -> BoxHandler {
    Box::new(CapRequest { wanted, next })
}

struct CtcpReframe {
    next: BoxHandler,
}

impl CtcpReframe {
    fn reframe(msg: &mut Message) {
        let query = msg.command == Command::PRIVMSG;
        if !query && msg.command != Command::NOTICE {
            return;
        }
        let Some(ctcp) = Ctcp::parse(msg.params.get(2)) else {
            return;
        };

        let command = if query {
            Command::ctcp_query(ctcp.sub)
        } else {
            Command::ctcp_reply(ctcp.sub)
        };
        let text = ctcp.text.to_owned();

        msg.command = command;
        if let Some(body) = msg.params.get_mut(2) {
            *body = text;
        }
    }
}

#[async_trait]
impl Handler for CtcpReframe {
    async fn handle(&self, writer: &dyn MessageWriter, msg: &mut Message) {
        Self::reframe(msg);
        self.next.handle(writer, msg).await
    }
}

struct PingReply {
    next: BoxHandler,
}

#[async_trait]
impl Handler for PingReply {
    async fn handle(&self, writer: &dyn MessageWriter, msg: &mut Message) {
        if msg.command != Command::PING {
            return self.next.handle(writer, msg).await;
        }
        writer.write_message(&Message::pong(msg.params.get(1))).await;
    }
}

fn is_cap_listing(msg: &Message) -> bool {
    if msg.command != Command::CAP || msg.params.len() < 3 {
        return false;
    }
    let sub = msg.params.get(2);
    sub.eq_ignore_ascii_case("LS") || sub.eq_ignore_ascii_case("NEW")
}

/// True for the last line of a `CAP LS` or a `CAP NEW` announcement.
fn is_final_cap_listing(msg: &Message) -> bool {
    is_cap_listing(msg) && msg.params.get(3) != "*"
}

struct CapComplete {
    next: BoxHandler,
}

#[async_trait]
impl Handler for CapComplete {
    async fn handle(&self, writer: &dyn MessageWriter, msg: &mut Message) {
        self.next.handle(writer, msg).await;

        // Servers without 302 support send multi-line LS without the `*`
        // marker, so each of those lines ends negotiation again. Later REQs
        // are still honoured after CAP END.
        if is_final_cap_listing(msg) {
            writer.write_message(&Message::cap_list()).await;
            writer.write_message(&Message::cap_end()).await;
        }
    }
}

struct CapRequest {
    wanted: Vec<String>,
    next: BoxHandler,
}

impl CapRequest {
    /// Advertised capabilities we want, in advertised order.
    fn select(&self, advertised: &str) -> Vec<String> {
        advertised
            .split_ascii_whitespace()
            .map(|cap| cap.split_once('=').map_or(cap, |(name, _)| name))
            .filter(|name| self.wanted.iter().any(|w| w.eq_ignore_ascii_case(name)))
            .map(str::to_owned)
            .collect()
    }
}

#[async_trait]
impl Handler for CapRequest {
    async fn handle(&self, writer: &dyn MessageWriter, msg: &mut Message) {
        if is_cap_listing(msg) {
            let caps = self.select(msg.params.last());
            if !caps.is_empty() {
                writer.write_message(&Message::cap_req(&caps.join(" "))).await;
            }
        }
        self.next.handle(writer, msg).await
    }
}
