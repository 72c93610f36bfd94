//! ipcbus core: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the wire envelope, the frame codec, and the closed
//! protocol contract shared by the messenger runtime and by any host that
//! talks to it. It carries no async runtime or transport dependency so the
//! contract can be reused on either side of the pipe.
//!
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed input
//! always surfaces as `IpcBusError::MalformedMessage`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, IpcBusError, Result};
