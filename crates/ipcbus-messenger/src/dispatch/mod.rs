//! Dispatcher module exports.
//!
//! Re-exports the messenger, the handler registry and the handler traits so
//! downstream consumers can depend on this module directly.

pub mod handler;
pub mod messenger;
pub mod registry;

pub use handler::{Handler, TypedHandler};
pub use messenger::{Messenger, Outbound};
pub use registry::HandlerRegistry;
