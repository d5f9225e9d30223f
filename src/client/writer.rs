//! The write side of a connection and its single-slot exit signal.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{oneshot, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::state::{ConnectionState, Status};
use crate::encode::IrcEncode;
use crate::error::{ClientError, EncodeWarning};
use crate::handler::MessageWriter;

/// Outcome placed in the exit slot.
pub(crate) type Exit = Result<(), ClientError>;

type BoxWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// How long closing the write half may take once the run is ending.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Serialised writer shared by the dispatcher, the prober and the shutdown
/// watcher.
///
/// Every write races the run's cancellation token, so a peer that stops
/// reading can stall a write but never the end of the run.
pub(crate) struct Link {
    write: AsyncMutex<Option<BoxWrite>>,
    exit: Mutex<Option<oneshot::Sender<Exit>>>,
    cancel: CancellationToken,
    state: Arc<RwLock<ConnectionState>>,
}

impl Link {
    pub(crate) fn new<W>(
        write: W,
        exit: oneshot::Sender<Exit>,
        cancel: CancellationToken,
        state: Arc<RwLock<ConnectionState>>,
    ) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Link {
            write: AsyncMutex::new(Some(Box::new(write))),
            exit: Mutex::new(Some(exit)),
            cancel,
            state,
        }
    }

    /// Request the run to end with `result`. Only the first request counts.
    ///
    /// Also cancels the run, which aborts any write still in progress.
    pub(crate) fn exit(&self, result: Exit) {
        match self.exit.lock().take() {
            Some(tx) => {
                // the receiver only goes away once the run has finished
                let _ = tx.send(result);
            }
            None => debug!(?result, "exit already requested; dropping"),
        }
        self.cancel.cancel();
    }

    /// Cancel the run and shut down the write half. Later writes are dropped.
    pub(crate) async fn close(&self) {
        self.cancel.cancel();
        let Some(mut write) = self.write.lock().await.take() else {
            return;
        };
        match tokio::time::timeout(CLOSE_TIMEOUT, write.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "error closing connection"),
            Err(_) => debug!("connection did not close in time; dropping it"),
        }
    }
}

/// Whether an encoded line is a QUIT, looking past tags and source.
fn is_quit(line: &[u8]) -> bool {
    let mut rest = line;
    for marker in [b'@', b':'] {
        if rest.first() == Some(&marker) {
            rest = match rest.iter().position(|&b| b == b' ') {
                Some(i) => &rest[i + 1..],
                None => return false,
            };
        }
    }
    rest.len() >= 4
        && rest[..4].eq_ignore_ascii_case(b"QUIT")
        && matches!(rest.get(4).copied(), None | Some(b' ' | b'\r' | b'\n'))
}

#[async_trait]
impl MessageWriter for Link {
    async fn write_message(&self, msg: &(dyn IrcEncode + Sync)) -> Option<EncodeWarning> {
        let origin = self.state.read().prefix();
        let mut buf = Vec::with_capacity(512);
        let warning = match msg.encode_relayed(&mut buf, &origin) {
            Ok(warning) => warning,
            Err(e) => {
                warn!(error = %e, "dropping outgoing message");
                return None;
            }
        };
        if let Some(w) = &warning {
            warn!(warning = %w, "outgoing message exceeds protocol limits");
        }
        if !buf.ends_with(b"\r\n") {
            buf.extend_from_slice(b"\r\n");
        }

        if is_quit(&buf) {
            self.state.write().status = Status::Disconnecting;
        }

        let mut guard = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!("connection closing; dropping outgoing message");
                return warning;
            }
            guard = self.write.lock() => guard,
        };
        let Some(write) = guard.as_mut() else {
            debug!("connection closed; dropping outgoing message");
            return warning;
        };
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!("connection closing; abandoning outgoing message");
                return warning;
            }
            result = async {
                write.write_all(&buf).await?;
                write.flush().await
            } => result,
        };
        drop(guard);

        if let Err(e) = result {
            self.exit(Err(e.into()));
        }
        warning
    }
}
