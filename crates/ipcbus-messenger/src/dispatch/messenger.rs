//! The messenger: send, register, invoke, and inbound dispatch.
//!
//! Outbound frames go to an unbounded queue drained by the transport
//! writer, so `send` never waits. Inbound messages fan out to every handler
//! registered for their type; each handler runs in its own task and
//! replies under the request's `messageId`. `invoke` calls the first handler
//! in-process and never touches the queue.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::{FutureExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use ipcbus_core::error::{IpcBusError, Result};
use ipcbus_core::protocol::{
    encode, new_message_id, Contract, Message, MessageId, Reply, ReplyError, ResponseShape,
};

use crate::config::MessengerSection;
use crate::dispatch::handler::{Handler, TypedHandler};
use crate::dispatch::registry::HandlerRegistry;

/// Receiving half of the outbound queue; owned by the transport writer.
pub type Outbound = mpsc::UnboundedReceiver<Bytes>;

#[derive(Clone)]
pub struct Messenger {
    inner: Arc<MessengerInner>,
}

struct MessengerInner {
    registry: HandlerRegistry,
    outbound: mpsc::UnboundedSender<Bytes>,
    error_replies: AtomicBool,
}

impl Messenger {
    pub fn new(outbound: mpsc::UnboundedSender<Bytes>, settings: &MessengerSection) -> Self {
        Self {
            inner: Arc::new(MessengerInner {
                registry: HandlerRegistry::new(),
                outbound,
                error_replies: AtomicBool::new(settings.error_replies),
            }),
        }
    }

    /// Messenger plus the queue its frames are written to.
    pub fn channel(settings: &MessengerSection) -> (Self, Outbound) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx, settings), rx)
    }

    /// Whether handler failures are answered with an error frame.
    pub fn set_error_replies(&self, enabled: bool) {
        self.inner.error_replies.store(enabled, Ordering::Relaxed);
    }

    pub fn error_replies(&self) -> bool {
        self.inner.error_replies.load(Ordering::Relaxed)
    }

    // --------------------
    // Outbound
    // --------------------

    /// Frame and queue one message. Returns the correlation id used,
    /// generating one when `message_id` is `None`.
    pub fn send<T: Serialize>(
        &self,
        message_type: &str,
        data: T,
        message_id: Option<MessageId>,
    ) -> Result<MessageId> {
        let msg = Message::new(message_type, data, message_id.unwrap_or_else(new_message_id));
        self.write(&msg)?;
        Ok(msg.message_id)
    }

    /// Typed `send` for a contract entry.
    pub fn send_request<K: Contract>(
        &self,
        data: &K::Request,
        message_id: Option<MessageId>,
    ) -> Result<MessageId> {
        self.send(K::name(), data, message_id)
    }

    /// Queue a fully built frame (including terminal and error frames).
    pub fn write<T: Serialize>(&self, msg: &Message<T>) -> Result<()> {
        let frame = encode(msg)?;
        self.inner
            .outbound
            .send(frame)
            .map_err(|_| IpcBusError::Transport("outbound channel closed".into()))
    }

    // --------------------
    // Registration
    // --------------------

    /// Register a typed handler for contract entry `K`.
    pub fn on<K, F, Fut>(&self, handler: F)
    where
        K: Contract,
        F: Fn(Message<K::Request>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<<K::Response as ResponseShape>::Output>> + Send + 'static,
    {
        self.inner
            .registry
            .register(K::name(), Arc::new(TypedHandler::<K, F>::new(handler)));
    }

    /// Register an untyped handler under any name.
    pub fn on_raw(&self, message_type: impl Into<String>, handler: Arc<dyn Handler>) {
        self.inner.registry.register(message_type, handler);
    }

    pub fn registered_types(&self) -> Vec<String> {
        self.inner.registry.registered_types()
    }

    // --------------------
    // In-process call-through
    // --------------------

    /// Call the first handler for `K` directly. `Ok(None)` when nothing is
    /// registered.
    pub async fn invoke<K: Contract>(
        &self,
        data: K::Request,
    ) -> Result<Option<<K::Response as ResponseShape>::Output>> {
        let data = serde_json::to_value(data)
            .map_err(|e| IpcBusError::Internal(format!("invoke payload encode failed: {e}")))?;
        match self.invoke_raw(K::name(), data).await? {
            Some(reply) => <K::Response as ResponseShape>::from_reply(reply).map(Some),
            None => Ok(None),
        }
    }

    /// Untyped `invoke`.
    pub async fn invoke_raw(&self, message_type: &str, data: Value) -> Result<Option<Reply>> {
        let Some(handler) = self.inner.registry.first(message_type) else {
            debug!(%message_type, "invoke: no handler registered");
            return Ok(None);
        };
        let msg = Message::new(message_type, data, new_message_id());
        handler.handle(msg).await.map(Some)
    }

    // --------------------
    // Inbound
    // --------------------

    /// Fan an inbound message out to its handlers.
    ///
    /// Returns immediately with one join handle per spawned handler task.
    /// Must be called within a tokio runtime.
    pub fn dispatch(&self, msg: Message) -> Vec<JoinHandle<()>> {
        if msg.is_control() {
            debug!(
                message_type = %msg.message_type,
                message_id = %msg.message_id,
                "ignoring inbound reply frame"
            );
            return Vec::new();
        }

        let handlers = self.inner.registry.handlers_for(&msg.message_type);
        if handlers.is_empty() {
            debug!(message_type = %msg.message_type, "no handler registered; dropping");
            return Vec::new();
        }

        handlers
            .into_iter()
            .enumerate()
            .map(|(idx, handler)| {
                let messenger = self.clone();
                let msg = msg.clone();
                tokio::spawn(async move { messenger.run_handler(idx, handler, msg).await })
            })
            .collect()
    }

    async fn run_handler(&self, idx: usize, handler: Arc<dyn Handler>, msg: Message) {
        let message_type = msg.message_type.clone();
        let message_id = msg.message_id.clone();

        let result = match AssertUnwindSafe(handler.handle(msg)).catch_unwind().await {
            Ok(r) => r,
            Err(panic) => Err(IpcBusError::HandlerFailure(format!(
                "handler panicked: {}",
                panic_message(panic.as_ref())
            ))),
        };

        let sent = match result {
            Ok(reply) => self.reply(&message_type, &message_id, reply).await,
            Err(e) => {
                error!(%message_type, %message_id, handler = idx, error = %e, "handler failed");
                self.fail(&message_type, &message_id, &e)
            }
        };

        if let Err(e) = sent {
            warn!(%message_type, %message_id, error = %e, "reply not delivered");
        }
    }

    async fn reply(&self, message_type: &str, message_id: &str, reply: Reply) -> Result<()> {
        let mut items = match reply {
            Reply::Unit => {
                return self.write(&Message::new(message_type, Value::Null, message_id.to_string()))
            }
            Reply::Value(v) => {
                return self.write(&Message::new(message_type, v, message_id.to_string()))
            }
            Reply::Stream(items) => items,
        };

        let mut sent = 0usize;
        loop {
            let next = match AssertUnwindSafe(items.next()).catch_unwind().await {
                Ok(next) => next,
                Err(panic) => Some(Err(IpcBusError::HandlerFailure(format!(
                    "stream panicked: {}",
                    panic_message(panic.as_ref())
                )))),
            };
            match next {
                Some(Ok(v)) => {
                    self.write(&Message::new(message_type, v, message_id.to_string()))?;
                    sent += 1;
                }
                Some(Err(e)) => {
                    error!(%message_type, %message_id, sent, error = %e, "stream failed");
                    if self.error_replies() {
                        return self.write(&Message::error_reply(
                            message_type,
                            message_id.to_string(),
                            ReplyError::from_error(&e),
                        ));
                    }
                    break;
                }
                None => break,
            }
        }

        debug!(%message_type, %message_id, sent, "stream complete");
        self.write(&Message::end_of_stream(message_type, message_id.to_string()))
    }

    fn fail(&self, message_type: &str, message_id: &str, err: &IpcBusError) -> Result<()> {
        if !self.error_replies() {
            return Ok(());
        }
        self.write(&Message::error_reply(
            message_type,
            message_id.to_string(),
            ReplyError::from_error(err),
        ))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
