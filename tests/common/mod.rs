//! A scripted IRC server on the far end of an in-memory stream.

#![allow(dead_code)]

use async_trait::async_trait;
use slirc_conn::client::dial_once;
use slirc_conn::{Command, Dialer, Handler, Message, MessageWriter};
use tokio::io::{
    AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
};
use tokio::sync::mpsc;

pub struct MockServer {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    write: WriteHalf<DuplexStream>,
}

/// A dialer for the client and the server it connects to.
pub fn pair() -> (Dialer, MockServer) {
    let (client, server) = tokio::io::duplex(16 * 1024);
    let (read, write) = tokio::io::split(server);
    let server = MockServer {
        lines: BufReader::new(read).lines(),
        write,
    };
    (dial_once(client), server)
}

impl MockServer {
    /// The next line from the client, terminator stripped.
    pub async fn recv(&mut self) -> String {
        self.lines
            .next_line()
            .await
            .expect("read from client")
            .expect("client closed the connection")
    }

    pub async fn expect(&mut self, want: &str) {
        assert_eq!(self.recv().await, want);
    }

    /// Consume the registration burst for `nick` with default settings.
    pub async fn expect_registration(&mut self, nick: &str) {
        self.expect("CAP LS :302").await;
        self.expect(&format!("NICK :{}", nick)).await;
        self.expect("USER guest 0 * :...").await;
    }

    pub async fn send(&mut self, line: &str) {
        self.write
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .expect("write to client");
    }

    /// Wait for the client to close its side.
    pub async fn expect_eof(&mut self) {
        let rest = self.lines.next_line().await.expect("read from client");
        assert_eq!(rest, None);
    }
}

/// Hands every message that reaches the end of the chain to the test.
pub struct Forward(pub mpsc::UnboundedSender<Message>);

pub fn forward() -> (Forward, mpsc::UnboundedReceiver<Message>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Forward(tx), rx)
}

#[async_trait]
impl Handler for Forward {
    async fn handle(&self, _writer: &dyn MessageWriter, msg: &mut Message) {
        let _ = self.0.send(msg.clone());
    }
}

/// Receive until a message with `command` arrives.
pub async fn wait_for(rx: &mut mpsc::UnboundedReceiver<Message>, command: &Command) -> Message {
    loop {
        let msg = rx.recv().await.expect("handler channel open");
        if msg.command == *command {
            return msg;
        }
    }
}
