use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error body returned by the backend. `detail` is a string for most
/// endpoints but validation failures may carry other shapes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }

    /// Backend detail, surfaced verbatim whenever it is a non-empty string.
    pub fn detail_text(&self) -> Option<&str> {
        match &self.detail {
            Some(Value::String(detail)) if !detail.is_empty() => Some(detail.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid identity payload: {reason}")]
pub struct IdentityError {
    pub reason: String,
}

impl IdentityError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
