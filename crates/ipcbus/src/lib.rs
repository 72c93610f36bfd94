//! Top-level facade crate for ipcbus.
//!
//! Re-exports core types and the messenger runtime so users can depend on a single crate.

pub mod core {
    pub use ipcbus_core::*;
}

pub mod messenger {
    pub use ipcbus_messenger::*;
}
