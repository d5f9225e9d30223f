//! # slirc-conn
//!
//! An IRC client library: a permissive wire codec with IRCv3 message tags,
//! and an async connection runner that drives registration, liveness
//! probing, capability negotiation and CTCP framing around your handler.
//!
//! ## Features
//!
//! - Hand-written lexer for the IRC line grammar, with byte positions in errors
//! - Encoding with hard errors for unframeable messages and soft warnings for
//!   lines a server may truncate
//! - IRCv3 tag escaping
//! - Optional Tokio client (default `tokio` feature) with a built-in
//!   middleware chain: CTCP reframing, PING replies, liveness probes, state
//!   tracking and CAP negotiation

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Creating IRC Messages
//!
//! ```rust
//! use slirc_conn::{IrcEncode, Message, Prefix};
//!
//! let privmsg = Message::privmsg("#rust", "Hello, world!");
//! assert_eq!(privmsg.to_bytes().unwrap(), b"PRIVMSG #rust :Hello, world!\r\n");
//!
//! let tagged = Message::privmsg("#dev", "Tagged message")
//!     .with_tag("msgid", "abc123")
//!     .with_source(Prefix::parse("bot!bot@example.com"));
//! assert_eq!(
//!     tagged.to_string(),
//!     "@msgid=abc123 :bot!bot@example.com PRIVMSG #dev :Tagged message\r\n"
//! );
//! ```
//!
//! ### Parsing IRC Messages
//!
//! ```rust
//! use slirc_conn::{Command, Message};
//!
//! let raw = "@time=2023-01-01T12:00:00Z :nick!user@host PRIVMSG #channel :Hello!";
//! let message: Message = raw.parse().expect("Valid IRC message");
//!
//! assert_eq!(message.command, Command::PRIVMSG);
//! assert_eq!(message.tags.get("time"), "2023-01-01T12:00:00Z");
//! assert_eq!(message.params.get(2), "Hello!");
//! ```
//!
//! ### Running a Client
//!
//! ```no_run
//! # async fn example() -> Result<(), slirc_conn::ClientError> {
//! use async_trait::async_trait;
//! use slirc_conn::{Client, ClientConfig, Command, Handler, Message, MessageWriter};
//! use tokio_util::sync::CancellationToken;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Handler for Echo {
//!     async fn handle(&self, w: &dyn MessageWriter, m: &mut Message) {
//!         if m.command == Command::PRIVMSG {
//!             w.write_message(&Message::privmsg(m.params.get(1), m.params.get(2))).await;
//!         }
//!     }
//! }
//!
//! let client = Client::new(ClientConfig::new("irc.example.com:6667", "echo"));
//! client.run(CancellationToken::new(), Echo).await
//! # }
//! ```

pub mod casemap;
pub mod command;
pub mod ctcp;
pub mod encode;
pub mod error;
pub mod message;
pub mod prefix;
pub mod response;
pub mod util;

#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod client;
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod handler;
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod line;
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod middleware;

#[cfg(feature = "proptest")]
#[cfg_attr(docsrs, doc(cfg(feature = "proptest")))]
pub mod strategies;

pub use self::casemap::{irc_eq, irc_to_lower};
pub use self::command::Command;
pub use self::ctcp::Ctcp;
pub use self::encode::IrcEncode;
pub use self::error::{
    ClientError, EncodeError, EncodeWarning, MessageParseError, ProtocolError, UnsupportedCommand,
};
pub use self::message::{Message, Params, Tags};
pub use self::prefix::Prefix;
pub use self::response::Response;

#[cfg(feature = "tokio")]
pub use self::client::{Client, ClientConfig, ConnectionState, Dialer, Status};
#[cfg(feature = "tokio")]
pub use self::handler::{BoxHandler, Handler, MessageWriter, Middleware, NoopHandler};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
