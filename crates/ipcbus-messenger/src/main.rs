//! ipcbus worker
//!
//! - Protocol stream on stdin/stdout, diagnostics on stderr
//! - Config from `IPCBUS_CONFIG` (default `ipcbus.yaml`, optional)
//! - Runs until the host closes stdin

use ipcbus_core::error::Result;
use ipcbus_messenger::{app_state, config, obs, transport};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("ipcbus-worker: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path =
        std::env::var("IPCBUS_CONFIG").unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_or_default(&path)?;
    obs::init_logging(&cfg.logging)?;

    let max_frame_bytes = cfg.messenger.max_frame_bytes;
    let (state, outbound) = app_state::AppState::new(cfg, &path);

    tracing::info!(
        config = %path,
        handlers = ?state.messenger().registered_types(),
        "ipcbus-worker starting"
    );

    transport::serve_stdio(state.messenger().clone(), outbound, max_frame_bytes).await?;

    tracing::info!("ipcbus-worker stopped");
    Ok(())
}
