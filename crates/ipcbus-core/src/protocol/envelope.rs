//! Message envelope (JSON).
//!
//! Every frame on the wire is one `Message`. Requests and success replies
//! carry exactly `messageType`, `data` and `messageId`; the optional `done`
//! and `error` fields only appear on terminal reply frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ErrorCode, IpcBusError, Result};

/// Opaque correlation token linking a request to its reply frame(s).
pub type MessageId = String;

/// Generate a fresh, globally unique correlation id.
pub fn new_message_id() -> MessageId {
    Uuid::new_v4().to_string()
}

/// One unit of communication.
///
/// `data` has no serde default: a record without a `data` key is rejected,
/// while an explicit `null` is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message<T = Value> {
    /// Protocol contract name (e.g. `history/load`).
    pub message_type: String,
    /// Payload, shaped per `message_type`.
    pub data: T,
    /// Correlation id.
    pub message_id: MessageId,
    /// Set on the terminal frame of a streaming reply.
    #[serde(default, skip_serializing_if = "is_false")]
    pub done: bool,
    /// Set on error-shaped reply frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReplyError>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Error body of an error-shaped reply frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyError {
    pub code: String,
    pub message: String,
}

impl ReplyError {
    pub fn from_error(err: &IpcBusError) -> Self {
        Self {
            code: err.code().as_str().to_string(),
            message: err.to_string(),
        }
    }

    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_str().to_string(),
            message: message.into(),
        }
    }
}

impl<T> Message<T> {
    /// A plain request or success-reply frame.
    pub fn new(message_type: impl Into<String>, data: T, message_id: MessageId) -> Self {
        Self {
            message_type: message_type.into(),
            data,
            message_id,
            done: false,
            error: None,
        }
    }

    /// True for terminal and error frames, which are never dispatched as requests.
    pub fn is_control(&self) -> bool {
        self.done || self.error.is_some()
    }
}

impl Message<Value> {
    /// End-of-stream frame for a streaming reply.
    pub fn end_of_stream(message_type: impl Into<String>, message_id: MessageId) -> Self {
        Self {
            done: true,
            ..Self::new(message_type, Value::Null, message_id)
        }
    }

    /// Error-shaped reply frame.
    pub fn error_reply(
        message_type: impl Into<String>,
        message_id: MessageId,
        error: ReplyError,
    ) -> Self {
        Self {
            error: Some(error),
            ..Self::new(message_type, Value::Null, message_id)
        }
    }

    /// Validate a parsed JSON value as a message record.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(IpcBusError::MalformedMessage(format!(
                "expected a JSON object, got {}",
                kind_of(&value)
            )));
        }
        serde_json::from_value(value).map_err(|e| IpcBusError::MalformedMessage(e.to_string()))
    }

    /// Decode `data` into the payload type of a contract entry.
    pub fn into_typed<T: serde::de::DeserializeOwned>(self) -> Result<Message<T>> {
        let data = serde_json::from_value(self.data).map_err(|e| {
            IpcBusError::MalformedMessage(format!(
                "{} payload does not match contract: {e}",
                self.message_type
            ))
        })?;
        Ok(Message {
            message_type: self.message_type,
            data,
            message_id: self.message_id,
            done: self.done,
            error: self.error,
        })
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
