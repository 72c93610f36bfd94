//! Built-in handlers registered by the worker binary.
//!
//! Everything else in the contract is served by embedders through
//! `Messenger::on`.

pub mod config_reload;

use crate::app_state::AppState;

pub fn register_builtin(state: &AppState) {
    config_reload::register(state);
}
