//! Transport layer (duplex byte stream).
//!
//! Frames are decoded once here, before they reach the messenger.

pub mod stdio;

pub use stdio::{serve, serve_stdio};
