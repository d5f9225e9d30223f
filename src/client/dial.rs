//! Establishing the byte stream.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;
use socket2::{SockRef, TcpKeepalive};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::warn;

/// Any bidirectional byte stream carrying CR-LF delimited IRC lines.
pub trait Connection: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> Connection for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

/// Type-erased connection.
pub type BoxConnection = Box<dyn Connection>;

/// Opens a connection. Set one on the client to use TLS, WebSocket or any
/// other transport instead of plain TCP.
#[derive(Clone)]
pub struct Dialer(Arc<dyn Fn() -> BoxFuture<'static, io::Result<BoxConnection>> + Send + Sync>);

impl Dialer {
    /// Wrap a function returning a connection future.
    pub fn new<F, Fut, C>(dial: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = io::Result<C>> + Send + 'static,
        C: Connection,
    {
        Dialer(Arc::new(move || {
            dial()
                .map(|res| res.map(|conn| Box::new(conn) as BoxConnection))
                .boxed()
        }))
    }

    pub(crate) async fn dial(&self) -> io::Result<BoxConnection> {
        (self.0)().await
    }
}

impl fmt::Debug for Dialer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dialer")
    }
}

/// A dialer that hands out `stream` once and fails afterwards. Handy for
/// tests and for transports set up before the client runs.
pub fn dial_once<C: Connection>(stream: C) -> Dialer {
    let slot = Arc::new(Mutex::new(Some(stream)));
    Dialer::new(move || {
        let stream = slot.lock().take();
        async move {
            stream.ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "stream already used"))
        }
    })
}

/// Connect over plain TCP with keep-alive enabled.
pub(crate) async fn dial_tcp(addr: &str) -> io::Result<BoxConnection> {
    let stream = TcpStream::connect(addr).await?;
    if let Err(e) = enable_keepalive(&stream) {
        warn!("failed to enable TCP keepalive: {}", e);
    }
    Ok(Box::new(stream))
}

fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    sock.set_tcp_keepalive(&keepalive)
}
