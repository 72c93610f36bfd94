//! Worker config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use ipcbus_core::error::{IpcBusError, Result};

pub use schema::{IpcBusConfig, LoggingSection, MessengerSection};

/// Config path used when `IPCBUS_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "ipcbus.yaml";

pub fn load_from_file(path: impl AsRef<Path>) -> Result<IpcBusConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .map_err(|e| IpcBusError::Config(format!("read {} failed: {e}", path.display())))?;
    load_from_str(&s)
}

/// Like [`load_from_file`], but a missing file yields the defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<IpcBusConfig> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(IpcBusConfig::default()),
        Err(e) => Err(IpcBusError::Config(format!(
            "read {} failed: {e}",
            path.display()
        ))),
    }
}

pub fn load_from_str(s: &str) -> Result<IpcBusConfig> {
    let cfg: IpcBusConfig = serde_yaml::from_str(s)
        .map_err(|e| IpcBusError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
