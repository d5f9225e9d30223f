//! Handler and writer contracts.
//!
//! Every inbound [`Message`] passes through one [`Handler`], awaited to
//! completion before the next line is dispatched. The client wraps the user
//! handler in a fixed chain of [`Middleware`]; routers and other dispatch
//! layers are built on the same contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::encode::IrcEncode;
use crate::error::EncodeWarning;
use crate::message::Message;

/// Sink for outgoing lines.
///
/// Writes are fire-and-forget: encode failures are logged and the line is
/// dropped, and transport failures end the connection rather than surfacing
/// here. The returned warning reports soft limits the line exceeded.
#[async_trait]
pub trait MessageWriter: Send + Sync {
    /// Encode `msg` and write it to the connection.
    async fn write_message(&self, msg: &(dyn IrcEncode + Sync)) -> Option<EncodeWarning>;
}

/// Responds to an inbound message.
///
/// The message is mutable so middleware can rewrite it before passing it on.
/// Handlers at the end of a chain should treat it as read-only.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle one message. Writes made through `writer` complete before this
    /// returns.
    async fn handle(&self, writer: &dyn MessageWriter, msg: &mut Message);
}

/// Type-erased handler.
pub type BoxHandler = Box<dyn Handler>;

/// Turns the next handler in a chain into a handler.
pub type Middleware = Box<dyn FnOnce(BoxHandler) -> BoxHandler + Send>;

/// Apply `middleware` around `handler`. The first entry is outermost and sees
/// each message first.
pub fn wrap(handler: BoxHandler, middleware: Vec<Middleware>) -> BoxHandler {
    middleware.into_iter().rev().fold(handler, |next, mw| mw(next))
}

/// A handler that ignores every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

#[async_trait]
impl Handler for NoopHandler {
    async fn handle(&self, _writer: &dyn MessageWriter, _msg: &mut Message) {}
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn handle(&self, writer: &dyn MessageWriter, msg: &mut Message) {
        (**self).handle(writer, msg).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn handle(&self, writer: &dyn MessageWriter, msg: &mut Message) {
        (**self).handle(writer, msg).await
    }
}


#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::testing::RecordingWriter;
    use super::*;

    struct Tag {
        name: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
        next: BoxHandler,
    }

    #[async_trait]
    impl Handler for Tag {
        async fn handle(&self, writer: &dyn MessageWriter, msg: &mut Message) {
            self.order.lock().push(self.name);
            self.next.handle(writer, msg).await
        }
    }

    fn tag(name: &'static str, order: &Arc<Mutex<Vec<&'static str>>>) -> Middleware {
        let order = order.clone();
        Box::new(move |next| Box::new(Tag { name, order, next }) as BoxHandler)
    }

    #[tokio::test]
    async fn test_wrap_first_is_outermost() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let chain = wrap(
            Box::new(NoopHandler),
            vec![tag("a", &order), tag("b", &order), tag("c", &order)],
        );

        let writer = RecordingWriter::default();
        chain.handle(&writer, &mut Message::ping("x")).await;
        assert_eq!(*order.lock(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_wrap_empty_is_identity() {
        let writer = RecordingWriter::default();
        let chain = wrap(Box::new(NoopHandler), Vec::new());
        chain.handle(&writer, &mut Message::ping("x")).await;
        assert!(writer.lines().is_empty());
    }
}
