//! End-to-end tests driving a client against a scripted server.

#![cfg(feature = "tokio")]

mod common;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use slirc_conn::{
    Client, ClientConfig, ClientError, Command, Dialer, Handler, Message, MessageWriter,
    NoopHandler, Status,
};
use slirc_conn::client::dial_once;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use common::{forward, pair, wait_for};

fn config() -> ClientConfig {
    ClientConfig::new("irc.test:6667", "me")
}

fn start<H>(
    client: &Arc<Client>,
    shutdown: &CancellationToken,
    handler: H,
) -> JoinHandle<Result<(), ClientError>>
where
    H: Handler + 'static,
{
    let client = client.clone();
    let shutdown = shutdown.clone();
    tokio::spawn(async move { client.run(shutdown, handler).await })
}

#[tokio::test]
async fn test_shutdown_sends_quit_and_returns_ok() {
    let (dialer, mut server) = pair();
    let client = Arc::new(Client::new(config()).with_dialer(dialer));
    let shutdown = CancellationToken::new();
    let run = start(&client, &shutdown, NoopHandler);

    server.expect_registration("me").await;
    shutdown.cancel();
    server.expect("QUIT :closing link").await;
    assert_eq!(client.status(), Status::Disconnecting);
    drop(server);

    run.await.unwrap().unwrap();
    assert_eq!(client.status(), Status::Disconnected);
}

#[tokio::test]
async fn test_password_is_sent_before_nick() {
    let (dialer, mut server) = pair();
    let client = Arc::new(Client::new(config().with_password("hunter2")).with_dialer(dialer));
    let shutdown = CancellationToken::new();
    let run = start(&client, &shutdown, NoopHandler);

    server.expect("CAP LS :302").await;
    server.expect("PASS :hunter2").await;
    server.expect("NICK :me").await;
    server.expect("USER guest 0 * :...").await;

    shutdown.cancel();
    server.expect("QUIT :closing link").await;
    drop(server);
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_server_ping_is_answered_and_consumed() {
    let (dialer, mut server) = pair();
    let client = Arc::new(Client::new(config()).with_dialer(dialer));
    let shutdown = CancellationToken::new();
    let (handler, mut seen) = forward();
    let run = start(&client, &shutdown, handler);

    server.expect_registration("me").await;
    server.send("PING :abc123").await;
    server.expect("PONG :abc123").await;

    server.send(":irc.test NOTICE me :after").await;
    let first = seen.recv().await.unwrap();
    assert_eq!(first.command, Command::NOTICE);

    shutdown.cancel();
    server.expect("QUIT :closing link").await;
    drop(server);
    run.await.unwrap().unwrap();
}

struct VersionReply;

#[async_trait]
impl Handler for VersionReply {
    async fn handle(&self, writer: &dyn MessageWriter, msg: &mut Message) {
        if msg.command == Command::CTCP_VERSION {
            writer
                .write_message(&Message::ctcp_reply(msg.source.nick.as_str(), "VERSION", "slirc-conn"))
                .await;
        }
    }
}

#[tokio::test]
async fn test_ctcp_query_reaches_handler_reframed() {
    let (dialer, mut server) = pair();
    let client = Arc::new(Client::new(config()).with_dialer(dialer));
    let shutdown = CancellationToken::new();
    let run = start(&client, &shutdown, VersionReply);

    server.expect_registration("me").await;
    server.send(":bob!b@host.example PRIVMSG me :\x01VERSION\x01").await;
    server.expect("NOTICE bob :\x01VERSION slirc-conn\x01").await;

    shutdown.cancel();
    server.expect("QUIT :closing link").await;
    drop(server);
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_sourceless_lines_come_from_the_server() {
    let (dialer, mut server) = pair();
    let client = Arc::new(Client::new(config()).with_dialer(dialer));
    let shutdown = CancellationToken::new();
    let (handler, mut seen) = forward();
    let run = start(&client, &shutdown, handler);

    server.expect_registration("me").await;
    server.send("NOTICE * :*** Looking up your hostname").await;
    let notice = wait_for(&mut seen, &Command::NOTICE).await;
    assert_eq!(notice.source.host, "irc.test");
    assert!(notice.source.nick.is_empty());

    shutdown.cancel();
    server.expect("QUIT :closing link").await;
    drop(server);
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_welcome_and_nick_change_are_tracked() {
    let (dialer, mut server) = pair();
    let client = Arc::new(Client::new(config()).with_dialer(dialer));
    let shutdown = CancellationToken::new();
    let (handler, mut seen) = forward();
    let run = start(&client, &shutdown, handler);

    server.expect_registration("me").await;
    server
        .send(":irc.example.net 001 me :Welcome to the network me!guest@host.example")
        .await;
    server.send(":irc.example.net 004 me irc.example.net ircd-1.0 io kl").await;
    server.send(":me!guest@host.example NICK :renamed").await;
    wait_for(&mut seen, &Command::NICK).await;

    let state = client.state();
    assert_eq!(client.nick(), "renamed");
    assert_eq!(state.user, "guest");
    assert_eq!(state.host, "host.example");
    assert_eq!(state.server, "irc.example.net");

    // someone else's rename leaves ours alone
    server.send(":other!o@elsewhere NICK :me").await;
    wait_for(&mut seen, &Command::NICK).await;
    assert_eq!(client.nick(), "renamed");

    shutdown.cancel();
    server.expect("QUIT :closing link").await;
    drop(server);
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_requested_caps_are_negotiated() {
    let (dialer, mut server) = pair();
    let config = config().with_caps(["server-time", "message-tags", "sasl"]);
    let client = Arc::new(Client::new(config).with_dialer(dialer));
    let shutdown = CancellationToken::new();
    let (handler, mut seen) = forward();
    let run = start(&client, &shutdown, handler);

    server.expect_registration("me").await;
    server
        .send(":irc.test CAP * LS :multi-prefix server-time message-tags=x")
        .await;
    server.expect("CAP REQ :server-time message-tags").await;
    server.expect("CAP :LIST").await;
    server.expect("CAP :END").await;

    server.send(":irc.test CAP me ACK :server-time message-tags").await;
    server.send(":irc.test NOTICE me :marker").await;
    wait_for(&mut seen, &Command::NOTICE).await;
    assert!(client.state().has_cap("server-time"));
    assert!(client.state().has_cap("message-tags"));
    assert!(!client.state().has_cap("sasl"));

    shutdown.cancel();
    server.expect("QUIT :closing link").await;
    drop(server);
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_multiline_cap_ls_waits_for_last_line() {
    let (dialer, mut server) = pair();
    let client = Arc::new(Client::new(config()).with_dialer(dialer));
    let shutdown = CancellationToken::new();
    let run = start(&client, &shutdown, NoopHandler);

    server.expect_registration("me").await;
    server.send(":irc.test CAP * LS * :multi-prefix").await;
    server.send(":irc.test CAP * LS :server-time").await;
    server.expect("CAP :LIST").await;
    server.expect("CAP :END").await;

    shutdown.cancel();
    server.expect("QUIT :closing link").await;
    drop(server);
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_remote_close_is_an_error() {
    let (dialer, mut server) = pair();
    let client = Arc::new(Client::new(config()).with_dialer(dialer));
    let run = start(&client, &CancellationToken::new(), NoopHandler);

    server.expect_registration("me").await;
    server.send("ERROR :Closing Link: me (Bye)").await;
    drop(server);

    let result = run.await.unwrap();
    assert!(matches!(result, Err(ClientError::ConnectionClosed)), "{:?}", result);
    assert_eq!(client.status(), Status::Disconnected);
}

struct QuitOnCommand;

#[async_trait]
impl Handler for QuitOnCommand {
    async fn handle(&self, writer: &dyn MessageWriter, msg: &mut Message) {
        if msg.command == Command::PRIVMSG && msg.params.get(2) == "!quit" {
            writer.write_message(&Message::quit("bye")).await;
        }
    }
}

#[tokio::test]
async fn test_handler_quit_then_remote_close_is_ok() {
    let (dialer, mut server) = pair();
    let client = Arc::new(Client::new(config()).with_dialer(dialer));
    let run = start(&client, &CancellationToken::new(), QuitOnCommand);

    server.expect_registration("me").await;
    server.send(":bob!b@host.example PRIVMSG #chan :!quit").await;
    server.expect("QUIT :bye").await;
    assert_eq!(client.status(), Status::Disconnecting);
    drop(server);

    run.await.unwrap().unwrap();
    assert_eq!(client.status(), Status::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_ends_run_when_peer_stops_reading() {
    // a tiny pipe that the server never drains
    let (conn, _server) = tokio::io::duplex(16);
    let client = Arc::new(Client::new(config()).with_dialer(dial_once(conn)));
    let shutdown = CancellationToken::new();
    let run = start(&client, &shutdown, NoopHandler);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!run.is_finished());
    shutdown.cancel();

    let result = tokio::time::timeout(Duration::from_secs(60), run)
        .await
        .expect("run ends within the quit grace period");
    result.unwrap().unwrap();
    assert_eq!(client.status(), Status::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_ping_timeout_ends_run_when_peer_stops_reading() {
    let (conn, _server) = tokio::io::duplex(16);
    let client = Arc::new(Client::new(config()).with_dialer(dial_once(conn)));
    let run = start(&client, &CancellationToken::new(), NoopHandler);

    let result = tokio::time::timeout(Duration::from_secs(3600), run)
        .await
        .expect("run ends once the PING goes unanswered");
    let result = result.unwrap();
    assert!(matches!(result, Err(ClientError::PingTimeout)), "{:?}", result);
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_probe_ends_the_run() {
    let (dialer, mut server) = pair();
    let client = Arc::new(Client::new(config()).with_dialer(dialer));
    let run = start(&client, &CancellationToken::new(), NoopHandler);

    server.expect_registration("me").await;
    // nothing arrives for the idle timeout, so the client probes
    server.expect("PING :TIMEOUTCHECK").await;

    let result = run.await.unwrap();
    assert!(matches!(result, Err(ClientError::PingTimeout)), "{:?}", result);
    server.expect_eof().await;
}

#[tokio::test(start_paused = true)]
async fn test_answered_probe_keeps_the_connection() {
    let (dialer, mut server) = pair();
    let client = Arc::new(Client::new(config()).with_dialer(dialer));
    let shutdown = CancellationToken::new();
    let (handler, mut seen) = forward();
    let run = start(&client, &shutdown, handler);

    server.expect_registration("me").await;
    server.expect("PING :TIMEOUTCHECK").await;
    server.send(":irc.test PONG irc.test :TIMEOUTCHECK").await;
    server.send(":irc.test NOTICE me :marker").await;

    // the PONG answered our probe and never reaches the handler
    let first = seen.recv().await.unwrap();
    assert_eq!(first.command, Command::NOTICE);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(!run.is_finished());

    shutdown.cancel();
    server.expect("QUIT :closing link").await;
    drop(server);
    run.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_quit_grace_expires() {
    let (dialer, mut server) = pair();
    let client = Arc::new(Client::new(config()).with_dialer(dialer));
    let shutdown = CancellationToken::new();
    let run = start(&client, &shutdown, NoopHandler);

    server.expect_registration("me").await;
    shutdown.cancel();
    server.expect("QUIT :closing link").await;

    // the server never closes; the grace period ends the run
    run.await.unwrap().unwrap();
    server.expect_eof().await;
}

#[tokio::test]
async fn test_second_run_is_rejected_while_active() {
    let (dialer, mut server) = pair();
    let client = Arc::new(Client::new(config()).with_dialer(dialer));
    let shutdown = CancellationToken::new();
    let run = start(&client, &shutdown, NoopHandler);

    server.expect_registration("me").await;
    let second = client.run(CancellationToken::new(), NoopHandler).await;
    assert!(matches!(second, Err(ClientError::AlreadyConnected)));

    shutdown.cancel();
    server.expect("QUIT :closing link").await;
    drop(server);
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_missing_settings_are_rejected() {
    let client = Client::new(ClientConfig::new("irc.test:6667", ""));
    let result = client.run(CancellationToken::new(), NoopHandler).await;
    assert!(matches!(result, Err(ClientError::MissingNickname)));

    let client = Client::new(ClientConfig::new("", "me"));
    let result = client.run(CancellationToken::new(), NoopHandler).await;
    assert!(matches!(result, Err(ClientError::MissingAddress)));
}

#[tokio::test]
async fn test_dial_failure_is_reported_and_run_can_be_retried() {
    let dialer = Dialer::new(|| async {
        Err::<tokio::io::DuplexStream, _>(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
    });
    let client = Client::new(config()).with_dialer(dialer);

    for _ in 0..2 {
        let result = client.run(CancellationToken::new(), NoopHandler).await;
        assert!(matches!(result, Err(ClientError::Io(ref e)) if e.kind() == io::ErrorKind::ConnectionRefused));
        assert_eq!(client.status(), Status::Disconnected);
    }
}
