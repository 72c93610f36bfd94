//! Built-in `config/reload` handler.
//!
//! Re-reads the worker config file and applies the settings that can change
//! at runtime (`messenger.error_replies`). Framing limits and the log filter
//! take effect on the next start.

use tracing::info;

use ipcbus_core::error::Result;
use ipcbus_core::protocol::contract::ConfigReload;

use crate::app_state::AppState;

pub fn register(state: &AppState) {
    let st = state.clone();
    state.messenger().on::<ConfigReload, _, _>(move |_msg| {
        let st = st.clone();
        async move { reload(&st).await }
    });
}

async fn reload(state: &AppState) -> Result<()> {
    let cfg = state.reload_config().await?;
    info!(
        path = %state.config_path().display(),
        error_replies = cfg.messenger.error_replies,
        "config reloaded"
    );
    Ok(())
}
