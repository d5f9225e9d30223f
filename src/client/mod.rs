//! The connection orchestrator.
//!
//! [`Client::run`] dials, registers, and then drives three tasks until the
//! connection ends:
//!
//! - the reader frames inbound bytes into lines and feeds a bounded channel,
//! - the dispatcher decodes each line and awaits the handler chain, sending a
//!   liveness probe whenever the connection has been idle too long,
//! - the shutdown watcher writes QUIT once the caller cancels.
//!
//! Every terminal condition goes through one first-wins exit slot, so a run
//! returns exactly one result.
//!
//! # Example
//!
//! ```no_run
//! use slirc_conn::{Client, ClientConfig, NoopHandler};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), slirc_conn::ClientError> {
//! let client = Client::new(ClientConfig::new("irc.example.com:6667", "slirc"));
//! client.run(CancellationToken::new(), NoopHandler).await
//! # }
//! ```

mod config;
mod dial;
mod pinger;
mod state;
mod writer;

pub use self::config::{ClientConfig, DEFAULT_QUIT_MESSAGE, DEFAULT_REALNAME, DEFAULT_USERNAME};
pub use self::dial::{dial_once, BoxConnection, Connection, Dialer};
pub use self::pinger::PROBE_TOKEN;
pub use self::state::{ConnectionState, Status};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use parking_lot::RwLock;
use tokio::io::AsyncRead;
use tokio::sync::{mpsc, oneshot};
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use self::pinger::Pinger;
use self::writer::Link;
use crate::error::{ClientError, ProtocolError};
use crate::handler::{wrap, BoxHandler, Handler, MessageWriter, Middleware};
use crate::line::LineCodec;
use crate::message::Message;
use crate::middleware;

/// Lines buffered between the reader and the dispatcher.
const LINE_BUFFER: usize = 64;

/// An IRC client connection.
///
/// One client runs at most one connection at a time; it can be run again
/// after the previous run has returned.
pub struct Client {
    config: ClientConfig,
    dialer: Option<Dialer>,
    state: Arc<RwLock<ConnectionState>>,
    active: AtomicBool,
}

impl Client {
    /// A client that dials `config.addr` over plain TCP.
    pub fn new(config: ClientConfig) -> Self {
        Client {
            config,
            dialer: None,
            state: Arc::new(RwLock::new(ConnectionState::default())),
            active: AtomicBool::new(false),
        }
    }

    /// Use `dialer` instead of plain TCP.
    #[must_use]
    pub fn with_dialer(mut self, dialer: Dialer) -> Self {
        self.dialer = Some(dialer);
        self
    }

    /// The settings this client runs with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Our current nickname as tracked from the server.
    pub fn nick(&self) -> String {
        self.state.read().nick.clone()
    }

    /// Where the client is in its connection lifecycle.
    pub fn status(&self) -> Status {
        self.state.read().status
    }

    /// Snapshot of the connection state.
    pub fn state(&self) -> ConnectionState {
        self.state.read().clone()
    }

    /// Connect, register and dispatch every inbound message to `handler`
    /// until the connection ends.
    ///
    /// Handlers are awaited one message at a time, in arrival order. Cancelling
    /// `shutdown` sends QUIT and waits briefly for the server to close the
    /// link.
    ///
    /// Returns `Ok(())` when the link closes after we sent QUIT, or when the
    /// quit grace period elapses. Everything else is an error.
    pub async fn run<H>(&self, shutdown: CancellationToken, handler: H) -> Result<(), ClientError>
    where
        H: Handler + 'static,
    {
        if self.config.nickname.is_empty() {
            return Err(ClientError::MissingNickname);
        }
        if self.config.addr.is_empty() && self.dialer.is_none() {
            return Err(ClientError::MissingAddress);
        }
        let _active = ActiveGuard::acquire(&self.active).ok_or(ClientError::AlreadyConnected)?;

        {
            let mut state = self.state.write();
            *state = ConnectionState {
                nick: self.config.nickname.clone(),
                user: self.config.username_or_default().to_owned(),
                server: self.config.server_host().to_owned(),
                status: Status::Connecting,
                ..Default::default()
            };
        }

        let span = info_span!("irc.client", server = %self.config.server_host());
        let result = self.connect_and_run(shutdown, Box::new(handler)).instrument(span).await;

        self.state.write().status = Status::Disconnected;
        result
    }

    async fn connect_and_run(
        &self,
        shutdown: CancellationToken,
        handler: BoxHandler,
    ) -> Result<(), ClientError> {
        let conn = match &self.dialer {
            Some(dialer) => dialer.dial().await?,
            None => dial::dial_tcp(&self.config.addr).await?,
        };
        info!("connected");

        let (read, write) = tokio::io::split(conn);
        let (exit_tx, mut exit_rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        let link = Arc::new(Link::new(write, exit_tx, cancel.clone(), self.state.clone()));
        let pinger = Arc::new(Pinger::new(self.config.ping_timeout));
        let handler = self.build_chain(handler, &pinger);

        let (line_tx, line_rx) = mpsc::channel(LINE_BUFFER);
        let frames = FramedRead::new(read, LineCodec::with_max_len(self.config.max_line_len));
        let reader = tokio::spawn(
            read_lines(frames, line_tx, cancel.clone(), link.clone()).in_current_span(),
        );
        let dispatcher = tokio::spawn(
            Dispatcher {
                lines: line_rx,
                handler,
                link: link.clone(),
                pinger: pinger.clone(),
                state: self.state.clone(),
                idle: self.config.idle_timeout,
                cancel: cancel.clone(),
            }
            .run()
            .in_current_span(),
        );
        let watcher = tokio::spawn(
            watch_shutdown(
                shutdown,
                cancel.clone(),
                link.clone(),
                self.config.quit_message.clone(),
                self.config.quit_grace,
            )
            .in_current_span(),
        );

        // registration can stall on a peer that never reads, so an exit
        // request must still be able to end the run
        let early = tokio::select! {
            exit = &mut exit_rx => Some(exit),
            () = self.register(&*link) => None,
        };
        let exit = match early {
            Some(exit) => exit,
            None => exit_rx.await,
        };
        // the link holds the sender until the first exit request
        let result = exit.unwrap_or(Err(ClientError::ReaderStopped));
        debug!(?result, "connection ending");

        cancel.cancel();
        link.close().await;
        for (name, task) in [("reader", reader), ("dispatcher", dispatcher), ("watcher", watcher)] {
            if let Err(e) = task.await {
                warn!(task = name, error = %e, "task failed");
            }
        }
        pinger.join().await;

        let disconnecting = self.state.read().status == Status::Disconnecting;
        info!("disconnected");
        match result {
            Err(ClientError::ConnectionClosed) if disconnecting => Ok(()),
            other => other,
        }
    }

    /// Wrap the user handler in the built-in middleware.
    fn build_chain(&self, handler: BoxHandler, pinger: &Arc<Pinger>) -> BoxHandler {
        let probes = pinger.clone();
        let shared = self.state.clone();
        let mut chain: Vec<Middleware> = vec![
            Box::new(middleware::ctcp),
            Box::new(middleware::ping_reply),
            Box::new(move |next| pinger::pong_matcher(probes, next)),
            Box::new(move |next| state::tracker(shared, next)),
            Box::new(middleware::cap_complete),
        ];
        if !self.config.request_caps.is_empty() {
            let wanted = self.config.request_caps.clone();
            chain.push(Box::new(move |next| middleware::cap_request(wanted, next)));
        }
        wrap(handler, chain)
    }

    async fn register(&self, writer: &dyn MessageWriter) {
        let config = &self.config;
        writer.write_message(&Message::cap_ls("302")).await;
        if let Some(pass) = config.password.as_deref().filter(|p| !p.is_empty()) {
            writer.write_message(&Message::pass(pass)).await;
        }
        writer.write_message(&Message::nick(config.nickname.as_str())).await;
        writer
            .write_message(&Message::user(
                config.username_or_default(),
                config.realname_or_default(),
            ))
            .await;

        let mut state = self.state.write();
        if state.status == Status::Connecting {
            state.status = Status::Connected;
        }
    }
}

/// Clears the active flag when a run ends, however it ends.
struct ActiveGuard<'a>(&'a AtomicBool);

impl<'a> ActiveGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ActiveGuard(flag))
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

async fn read_lines<R>(
    mut frames: FramedRead<R, LineCodec>,
    lines: mpsc::Sender<String>,
    cancel: CancellationToken,
    link: Arc<Link>,
) where
    R: AsyncRead + Unpin,
{
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return,
            next = frames.next() => next,
        };
        let line = match next {
            Some(Ok(line)) => line,
            Some(Err(ProtocolError::Io(e))) => return link.exit(Err(ClientError::Io(e))),
            Some(Err(e)) => return link.exit(Err(e.into())),
            None => return link.exit(Err(ClientError::ConnectionClosed)),
        };
        if line.is_empty() {
            continue;
        }
        tokio::select! {
            _ = cancel.cancelled() => return,
            sent = lines.send(line) => if sent.is_err() {
                return;
            },
        }
    }
}

struct Dispatcher {
    lines: mpsc::Receiver<String>,
    handler: BoxHandler,
    link: Arc<Link>,
    pinger: Arc<Pinger>,
    state: Arc<RwLock<ConnectionState>>,
    idle: Duration,
    cancel: CancellationToken,
}

impl Dispatcher {
    async fn run(mut self) {
        loop {
            let line = tokio::select! {
                _ = self.cancel.cancelled() => return,
                line = self.lines.recv() => match line {
                    Some(line) => line,
                    None => return self.link.exit(Err(ClientError::ReaderStopped)),
                },
                _ = tokio::time::sleep(self.idle) => {
                    self.pinger.ping(&self.link, PROBE_TOKEN, &self.cancel).await;
                    continue;
                }
            };

            let mut msg: Message = match line.parse() {
                Ok(msg) => msg,
                Err(cause) => {
                    let err = ProtocolError::InvalidMessage { string: line, cause };
                    warn!(error = %err, "dropping inbound line");
                    continue;
                }
            };
            // rfc1459: a line without a prefix came from the server itself
            if msg.source.is_empty() {
                msg.source.host = self.state.read().server.clone();
            }
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                () = self.handler.handle(&*self.link, &mut msg) => {}
            }
        }
    }
}

async fn watch_shutdown(
    shutdown: CancellationToken,
    cancel: CancellationToken,
    link: Arc<Link>,
    quit_message: String,
    grace: Duration,
) {
    tokio::select! {
        // the run is already ending
        _ = cancel.cancelled() => return,
        _ = shutdown.cancelled() => {}
    }
    debug!("shutdown requested");

    // the grace period covers sending QUIT as well as waiting for the close
    let deadline = tokio::time::sleep(grace);
    tokio::pin!(deadline);
    let quit = Message::quit(quit_message);
    tokio::select! {
        _ = link.write_message(&quit) => {}
        _ = &mut deadline => {
            debug!("QUIT could not be sent in time; giving up");
            return link.exit(Ok(()));
        }
    }
    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = &mut deadline => {
            debug!("server did not close the link; giving up");
            link.exit(Ok(()));
        }
    }
}
