//! Diagnostics side channel.
//!
//! stdout carries the protocol stream, so every diagnostic line goes to
//! stderr. Call [`init_logging`] once at startup, before the transport runs.

use tracing::Subscriber;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use ipcbus_core::error::{IpcBusError, Result};

use crate::config::LoggingSection;

pub fn init_logging(cfg: &LoggingSection) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.filter))
        .map_err(|e| IpcBusError::Config(format!("logging.filter is invalid: {e}")))?;

    subscriber(filter, cfg.ansi, std::io::stderr)
        .try_init()
        .map_err(|e| IpcBusError::Internal(format!("logging init failed: {e}")))
}

/// Formatting subscriber bound to `writer`; `init_logging` passes stderr.
pub fn subscriber<W>(
    filter: EnvFilter,
    ansi: bool,
    writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .finish()
}
