//! Shared worker state.
//!
//! Owns the live config and the messenger, and registers the built-in
//! handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use ipcbus_core::error::Result;

use crate::config::{self, IpcBusConfig};
use crate::dispatch::{Messenger, Outbound};
use crate::services;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    messenger: Messenger,
}

struct AppStateInner {
    config_path: PathBuf,
    cfg: RwLock<Arc<IpcBusConfig>>,
}

impl AppState {
    /// Build state and return the outbound queue for the transport.
    pub fn new(cfg: IpcBusConfig, config_path: impl Into<PathBuf>) -> (Self, Outbound) {
        let (messenger, outbound) = Messenger::channel(&cfg.messenger);

        let state = Self {
            inner: Arc::new(AppStateInner {
                config_path: config_path.into(),
                cfg: RwLock::new(Arc::new(cfg)),
            }),
            messenger,
        };

        services::register_builtin(&state);

        (state, outbound)
    }

    pub async fn cfg(&self) -> Arc<IpcBusConfig> {
        Arc::clone(&*self.inner.cfg.read().await)
    }

    pub fn config_path(&self) -> &Path {
        &self.inner.config_path
    }

    /// Re-read the config file and apply runtime-adjustable settings.
    /// The previous config stays active if the new one is invalid.
    pub async fn reload_config(&self) -> Result<Arc<IpcBusConfig>> {
        let cfg = Arc::new(config::load_or_default(&self.inner.config_path)?);
        self.messenger.set_error_replies(cfg.messenger.error_replies);
        *self.inner.cfg.write().await = Arc::clone(&cfg);
        Ok(cfg)
    }

    pub fn messenger(&self) -> &Messenger {
        &self.messenger
    }
}
