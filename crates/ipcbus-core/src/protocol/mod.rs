//! Protocol modules (envelope, framing, contract).
//!
//! - `envelope`: the `Message` record and correlation ids.
//! - `frame`: newline-terminated encoding and the incremental decoder.
//! - `contract`: the closed table of message types and their shapes.
//! - `shape`: response shapes and the erased `Reply`.
//! - `types`: payload data carried by contract entries.
//!
//! All parsers are panic-free: malformed input is reported as
//! `IpcBusError::MalformedMessage` instead of panicking.

pub mod contract;
pub mod envelope;
pub mod frame;
pub mod shape;
pub mod types;

pub use contract::{Contract, MessageType};
pub use envelope::{new_message_id, Message, MessageId, ReplyError};
pub use frame::{decode, encode, FrameDecoder};
pub use shape::{
    Deferred, FireAndForget, Reply, ReplyStream, ResponseKind, ResponseShape, Single, Streaming,
};
