//! Simple IRC client example
//!
//! Connects, joins a channel once registered, greets anyone who says hello
//! and answers CTCP VERSION. Saying `!quit` in the channel disconnects.
//!
//! ```text
//! cargo run --example simple_client -- irc.libera.chat:6667 slirc_demo '#slirc-test'
//! ```

use async_trait::async_trait;
use slirc_conn::{Client, ClientConfig, Command, Handler, Message, MessageWriter, Response};
use tokio_util::sync::CancellationToken;
use tracing::info;

struct Demo {
    channel: String,
    shutdown: CancellationToken,
}

#[async_trait]
impl Handler for Demo {
    async fn handle(&self, writer: &dyn MessageWriter, msg: &mut Message) {
        if msg.command == Response::RPL_WELCOME {
            info!("registered; joining {}", self.channel);
            writer.write_message(&Message::join(self.channel.as_str())).await;
        } else if msg.command == Command::PRIVMSG {
            let text = msg.params.get(2);
            if text == "!quit" {
                self.shutdown.cancel();
            } else if text.to_ascii_lowercase().starts_with("hello") {
                let reply = format!("hello, {}!", msg.source.nick);
                writer.write_message(&Message::privmsg(msg.params.get(1), reply)).await;
            }
        } else if msg.command == Command::CTCP_VERSION {
            writer
                .write_message(&Message::ctcp_reply(
                    msg.source.nick.as_str(),
                    "VERSION",
                    concat!("slirc-conn ", env!("CARGO_PKG_VERSION")),
                ))
                .await;
        } else if msg.command == Command::CTCP_ACTION {
            info!("* {} {}", msg.source.nick, msg.params.get(2));
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,slirc_conn=debug".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| "irc.libera.chat:6667".to_owned());
    let nick = args.next().unwrap_or_else(|| "slirc_demo".to_owned());
    let channel = args.next().unwrap_or_else(|| "#slirc-test".to_owned());

    let config = ClientConfig::new(addr, nick)
        .with_realname("slirc-conn demo")
        .with_caps(["server-time", "message-tags"]);
    let client = Client::new(config);

    let shutdown = CancellationToken::new();
    let handler = Demo {
        channel,
        shutdown: shutdown.clone(),
    };

    client.run(shutdown, handler).await?;
    info!("bye");
    Ok(())
}
