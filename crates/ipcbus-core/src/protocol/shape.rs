//! Response shapes.
//!
//! Every contract entry answers in one of three ways: nothing
//! (fire-and-forget), one value (immediate or deferred), or a lazy stream of
//! values. Handlers produce the typed `Output` of their shape; the messenger
//! works with the erased `Reply`.

use std::marker::PhantomData;

use futures_util::stream::{BoxStream, StreamExt};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{IpcBusError, Result};

/// Response kind of a contract entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// No meaningful reply; one frame with `null` data.
    FireAndForget,
    /// One value, produced without outside collaborators.
    Single,
    /// One value, produced after awaiting a collaborator.
    Deferred,
    /// Open-ended sequence; one frame per item plus a terminal frame.
    Streaming,
}

/// Erased item stream of a streaming reply.
pub type ReplyStream = BoxStream<'static, Result<Value>>;

/// Erased handler result as seen by the dispatcher.
pub enum Reply {
    Unit,
    Value(Value),
    Stream(ReplyStream),
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Unit => f.write_str("Unit"),
            Reply::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Reply::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Typed response shape of a contract entry.
pub trait ResponseShape: Send + 'static {
    const KIND: ResponseKind;

    /// What a handler for this shape returns.
    type Output: Send + 'static;

    fn into_reply(out: Self::Output) -> Result<Reply>;

    fn from_reply(reply: Reply) -> Result<Self::Output>;
}

/// No reply payload.
pub struct FireAndForget;

/// One value, available when the handler returns.
pub struct Single<T>(PhantomData<fn() -> T>);

/// One value that the handler resolves asynchronously.
pub struct Deferred<T>(PhantomData<fn() -> T>);

/// Lazy, possibly infinite sequence of values.
pub struct Streaming<T>(PhantomData<fn() -> T>);

impl ResponseShape for FireAndForget {
    const KIND: ResponseKind = ResponseKind::FireAndForget;
    type Output = ();

    fn into_reply(_out: ()) -> Result<Reply> {
        Ok(Reply::Unit)
    }

    fn from_reply(_reply: Reply) -> Result<()> {
        Ok(())
    }
}

fn value_into_reply<T: Serialize>(out: T) -> Result<Reply> {
    serde_json::to_value(out)
        .map(Reply::Value)
        .map_err(|e| IpcBusError::Internal(format!("reply encode failed: {e}")))
}

fn value_from_reply<T: DeserializeOwned>(reply: Reply) -> Result<T> {
    let v = match reply {
        Reply::Unit => Value::Null,
        Reply::Value(v) => v,
        Reply::Stream(_) => {
            return Err(IpcBusError::Internal(
                "expected a single value, handler returned a stream".into(),
            ))
        }
    };
    serde_json::from_value(v)
        .map_err(|e| IpcBusError::Internal(format!("reply decode failed: {e}")))
}

impl<T> ResponseShape for Single<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    const KIND: ResponseKind = ResponseKind::Single;
    type Output = T;

    fn into_reply(out: T) -> Result<Reply> {
        value_into_reply(out)
    }

    fn from_reply(reply: Reply) -> Result<T> {
        value_from_reply(reply)
    }
}

impl<T> ResponseShape for Deferred<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    const KIND: ResponseKind = ResponseKind::Deferred;
    type Output = T;

    fn into_reply(out: T) -> Result<Reply> {
        value_into_reply(out)
    }

    fn from_reply(reply: Reply) -> Result<T> {
        value_from_reply(reply)
    }
}

impl<T> ResponseShape for Streaming<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    const KIND: ResponseKind = ResponseKind::Streaming;
    type Output = BoxStream<'static, Result<T>>;

    fn into_reply(out: Self::Output) -> Result<Reply> {
        let items = out.map(|item| {
            item.and_then(|v| {
                serde_json::to_value(v)
                    .map_err(|e| IpcBusError::Internal(format!("stream item encode failed: {e}")))
            })
        });
        Ok(Reply::Stream(items.boxed()))
    }

    fn from_reply(reply: Reply) -> Result<Self::Output> {
        match reply {
            Reply::Stream(s) => Ok(s
                .map(|item| {
                    item.and_then(|v| {
                        serde_json::from_value(v).map_err(|e| {
                            IpcBusError::Internal(format!("stream item decode failed: {e}"))
                        })
                    })
                })
                .boxed()),
            other => Err(IpcBusError::Internal(format!(
                "expected a stream, handler returned {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use futures_util::stream;

    #[tokio::test]
    async fn stream_shape_keeps_item_order() {
        let items: BoxStream<'static, Result<String>> =
            stream::iter(["a", "b", "c"].map(|s| Ok(s.to_string()))).boxed();
        let reply = Streaming::<String>::into_reply(items).unwrap();
        let back = Streaming::<String>::from_reply(reply).unwrap();
        let got: Vec<String> = back.map(|r| r.unwrap()).collect().await;
        assert_eq!(got, ["a", "b", "c"]);
    }

    #[test]
    fn single_rejects_stream_reply() {
        let reply = Reply::Stream(stream::empty().boxed());
        assert!(Single::<u32>::from_reply(reply).is_err());
    }
}
