//! Active liveness probing.
//!
//! When the connection goes quiet the dispatcher sends `PING <token>` and a
//! waiter task gives the server a bounded time to answer. The matching PONG
//! is consumed by [`pong_matcher`]; an unanswered probe ends the run with
//! [`ClientError::PingTimeout`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, Instrument};

use super::writer::Link;
use crate::command::Command;
use crate::error::ClientError;
use crate::handler::{BoxHandler, Handler, MessageWriter};
use crate::message::Message;

/// Token used for idle probes.
pub const PROBE_TOKEN: &str = "TIMEOUTCHECK";

/// Outstanding probes, keyed by token.
pub(crate) struct Pinger {
    expecting: Mutex<HashMap<String, oneshot::Sender<()>>>,
    waiters: Mutex<Vec<JoinHandle<()>>>,
    timeout: Duration,
}

impl Pinger {
    pub(crate) fn new(timeout: Duration) -> Self {
        Pinger {
            expecting: Mutex::new(HashMap::new()),
            waiters: Mutex::new(Vec::new()),
            timeout,
        }
    }

    /// Send a probe carrying `token` unless one with that token is already
    /// outstanding.
    pub(crate) async fn ping(
        self: &Arc<Self>,
        link: &Arc<Link>,
        token: &str,
        cancel: &CancellationToken,
    ) {
        let (tx, rx) = oneshot::channel();
        {
            let mut expecting = self.expecting.lock();
            if expecting.contains_key(token) {
                return;
            }
            expecting.insert(token.to_owned(), tx);
        }

        let waiter = {
            let pinger = Arc::clone(self);
            let link = Arc::clone(link);
            let cancel = cancel.clone();
            let token = token.to_owned();
            tokio::spawn(
                async move {
                    tokio::select! {
                        _ = rx => debug!(%token, "probe answered"),
                        _ = cancel.cancelled() => {}
                        _ = tokio::time::sleep(pinger.timeout) => {
                            debug!(%token, "probe unanswered");
                            link.exit(Err(ClientError::PingTimeout));
                        }
                    }
                    // our receiver is gone now; leave a newer probe alone
                    let mut expecting = pinger.expecting.lock();
                    if expecting.get(&token).map_or(false, |tx| tx.is_closed()) {
                        expecting.remove(&token);
                    }
                }
                .in_current_span(),
            )
        };
        {
            let mut waiters = self.waiters.lock();
            waiters.retain(|w| !w.is_finished());
            waiters.push(waiter);
        }

        debug!(%token, "sending liveness probe");
        link.write_message(&Message::ping(token)).await;
    }

    /// Complete the probe for `token`. Returns false if none was outstanding.
    fn answer(&self, token: &str) -> bool {
        match self.expecting.lock().remove(token) {
            Some(tx) => {
                // the waiter may have just timed out
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    /// Wait for every probe waiter to finish.
    pub(crate) async fn join(&self) {
        let waiters = std::mem::take(&mut *self.waiters.lock());
        for waiter in waiters {
            let _ = waiter.await;
        }
    }
}

/// Middleware consuming PONGs that answer an outstanding probe. Unsolicited
/// PONGs are passed on.
pub(crate) fn pong_matcher(pinger: Arc<Pinger>, next: BoxHandler) -> BoxHandler {
    Box::new(PongMatcher { pinger, next })
}

struct PongMatcher {
    pinger: Arc<Pinger>,
    next: BoxHandler,
}

#[async_trait]
impl Handler for PongMatcher {
    async fn handle(&self, writer: &dyn MessageWriter, msg: &mut Message) {
        if msg.command == Command::PONG && self.pinger.answer(msg.params.last()) {
            return;
        }
        self.next.handle(writer, msg).await
    }
}
