use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use ipcbus_core::error::{IpcBusError, Result};
use ipcbus_core::protocol::frame::DEFAULT_MAX_FRAME_BYTES;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IpcBusConfig {
    pub version: u32,

    #[serde(default)]
    pub messenger: MessengerSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

impl Default for IpcBusConfig {
    fn default() -> Self {
        Self {
            version: 1,
            messenger: MessengerSection::default(),
            logging: LoggingSection::default(),
        }
    }
}

impl IpcBusConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(IpcBusError::UnsupportedVersion);
        }

        self.messenger.validate()?;
        self.logging.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessengerSection {
    /// Upper bound for one buffered inbound record.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Answer handler failures with an error-shaped reply frame.
    #[serde(default = "default_error_replies")]
    pub error_replies: bool,
}

impl Default for MessengerSection {
    fn default() -> Self {
        Self {
            max_frame_bytes: default_max_frame_bytes(),
            error_replies: default_error_replies(),
        }
    }
}

impl MessengerSection {
    pub fn validate(&self) -> Result<()> {
        if !(1024..=256 * 1024 * 1024).contains(&self.max_frame_bytes) {
            return Err(IpcBusError::Config(
                "messenger.max_frame_bytes must be between 1024 and 268435456".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_frame_bytes() -> usize {
    DEFAULT_MAX_FRAME_BYTES
}
fn default_error_replies() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_filter")]
    pub filter: String,

    #[serde(default)]
    pub ansi: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            ansi: false,
        }
    }
}

impl LoggingSection {
    pub fn validate(&self) -> Result<()> {
        EnvFilter::try_new(&self.filter)
            .map(|_| ())
            .map_err(|e| IpcBusError::Config(format!("logging.filter is invalid: {e}")))
    }
}

fn default_filter() -> String {
    "info".into()
}
