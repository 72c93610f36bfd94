use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use ipcbus_core::error::Result;
use ipcbus_core::protocol::{Contract, Message, Reply, ResponseShape};

/// Untyped handler as stored in the registry.
///
/// Implement this directly to serve a message type outside the contract;
/// contract entries go through [`TypedHandler`].
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, msg: Message) -> Result<Reply>;
}

/// Adapter from a typed closure to [`Handler`].
///
/// Decodes `data` into the entry's request type and erases the output into
/// a [`Reply`] per the entry's response shape.
pub struct TypedHandler<K, F> {
    f: F,
    _contract: PhantomData<fn() -> K>,
}

impl<K, F> TypedHandler<K, F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _contract: PhantomData,
        }
    }
}

#[async_trait]
impl<K, F, Fut> Handler for TypedHandler<K, F>
where
    K: Contract,
    F: Fn(Message<K::Request>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<<K::Response as ResponseShape>::Output>> + Send + 'static,
{
    async fn handle(&self, msg: Message) -> Result<Reply> {
        let typed = msg.into_typed::<K::Request>()?;
        let out = (self.f)(typed).await?;
        <K::Response as ResponseShape>::into_reply(out)
    }
}
