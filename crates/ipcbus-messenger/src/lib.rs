//! ipcbus messenger library entry.
//!
//! This crate wires the handler registry, the messenger, the byte-stream
//! transport, config and diagnostics into a worker runtime. It is consumed
//! by the `ipcbus-worker` binary, by embedders that register contract
//! handlers, and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod services;
pub mod transport;

pub use dispatch::{Handler, Messenger, Outbound};
