//! Shared error type across ipcbus crates.

use thiserror::Error;

/// Error codes carried by error-shaped reply frames (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Undecodable frame or payload.
    MalformedMessage,
    /// No handler registered for the message type.
    UnregisteredHandler,
    /// A handler returned an error or panicked.
    HandlerFailure,
    /// Transport closed or failed.
    Transport,
    /// Invalid configuration.
    Config,
    /// Unsupported config/protocol version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in reply frames.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MalformedMessage => "MALFORMED_MESSAGE",
            ErrorCode::UnregisteredHandler => "UNREGISTERED_HANDLER",
            ErrorCode::HandlerFailure => "HANDLER_FAILURE",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::Config => "CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, IpcBusError>;

/// Unified error type used by core and messenger.
#[derive(Debug, Error)]
pub enum IpcBusError {
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    #[error("no handler registered for {0}")]
    UnregisteredHandler(String),
    #[error("handler failed: {0}")]
    HandlerFailure(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl IpcBusError {
    /// Map internal error to a stable wire code.
    pub fn code(&self) -> ErrorCode {
        match self {
            IpcBusError::MalformedMessage(_) => ErrorCode::MalformedMessage,
            IpcBusError::UnregisteredHandler(_) => ErrorCode::UnregisteredHandler,
            IpcBusError::HandlerFailure(_) => ErrorCode::HandlerFailure,
            IpcBusError::Transport(_) => ErrorCode::Transport,
            IpcBusError::Config(_) => ErrorCode::Config,
            IpcBusError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            IpcBusError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Handler error from anything printable.
    pub fn handler(msg: impl std::fmt::Display) -> Self {
        IpcBusError::HandlerFailure(msg.to_string())
    }
}
