//! Reply model for editor transactions.
//!
//! The editor plugin answers with a JSON object carrying a string `status`
//! discriminator (`"success"` or `"error"`). Here that is lifted into a
//! tagged enum so a caller cannot read a result without first matching on
//! the outcome.

use serde_json::{json, Map, Value};
use thiserror::Error;

/// Everything that can end a transaction without a result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    /// No connection could be established when the transaction began.
    #[error("Not connected to Unreal Engine at {endpoint}: {reason}")]
    NotConnected {
        /// `host:port` that was dialled
        endpoint: String,
        /// Why the connect attempt failed
        reason: String,
    },

    /// Bytes arrived but did not parse after normalization.
    #[error("Json error: {diagnostic}")]
    MalformedReply {
        /// Best available text recovered from the reply bytes
        diagnostic: String,
    },

    /// Socket-level failure that survived the retry.
    #[error("Communication error: {0}")]
    Communication(String),

    /// The editor reported a failure of its own.
    #[error("{message}")]
    Remote {
        /// Remote-supplied message
        message: String,
        /// Remote-supplied stack trace, if any
        traceback: Option<String>,
        /// The decoded reply exactly as received
        payload: Value,
    },
}

impl BridgeError {
    /// Human-readable message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            BridgeError::MalformedReply { diagnostic } => diagnostic.clone(),
            BridgeError::Remote { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn traceback(&self) -> Option<&str> {
        match self {
            BridgeError::Remote { traceback, .. } => traceback.as_deref(),
            _ => None,
        }
    }

    /// Wire-shaped representation of the error.
    ///
    /// Remote errors are returned verbatim; locally generated ones use the
    /// plugin's own `{"status": "error", "message": ...}` shape.
    pub fn to_value(&self) -> Value {
        match self {
            BridgeError::Remote { payload, .. } => payload.clone(),
            BridgeError::MalformedReply { .. } => json!({
                "status": "error",
                "message": self.to_string(),
            }),
            other => json!({
                "status": "error",
                "message": other.to_string(),
            }),
        }
    }
}

/// Outcome of exactly one transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The editor ran the operation; carries its `result` (or `Null`).
    Success(Value),
    /// The transaction ended without a result.
    Error(BridgeError),
}

impl Reply {
    /// Classify a decoded reply value.
    ///
    /// Only an object whose `status` is `"success"` counts as success.
    /// Anything else, including a missing status or a non-object payload,
    /// is a remote error.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut obj) => {
                if obj.get("status").and_then(Value::as_str) == Some("success") {
                    let result = obj.remove("result").unwrap_or(Value::Null);
                    return Reply::Success(result);
                }
                let message = obj
                    .get("message")
                    .map(value_to_text)
                    .unwrap_or_else(|| "Unknown error".to_string());
                let traceback = obj
                    .get("traceback")
                    .filter(|t| !t.is_null())
                    .map(value_to_text)
                    .filter(|t| !t.is_empty());
                Reply::Error(BridgeError::Remote {
                    message,
                    traceback,
                    payload: Value::Object(obj),
                })
            }
            other => Reply::Error(BridgeError::Remote {
                message: value_to_text(&other),
                traceback: None,
                payload: other,
            }),
        }
    }

    pub fn error(err: BridgeError) -> Self {
        Reply::Error(err)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }

    pub fn result(&self) -> Option<&Value> {
        match self {
            Reply::Success(value) => Some(value),
            Reply::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&BridgeError> {
        match self {
            Reply::Success(_) => None,
            Reply::Error(err) => Some(err),
        }
    }

    /// Error message, if this is an error reply.
    pub fn message(&self) -> Option<String> {
        self.as_error().map(BridgeError::message)
    }

    /// Wire-shaped JSON for the reply.
    pub fn to_value(&self) -> Value {
        match self {
            Reply::Success(result) => {
                let mut obj = Map::new();
                obj.insert("status".into(), Value::from("success"));
                obj.insert("result".into(), result.clone());
                Value::Object(obj)
            }
            Reply::Error(err) => err.to_value(),
        }
    }
}

/// Render a JSON value as plain text: strings unquoted, everything else as JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
