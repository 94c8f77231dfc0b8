//! Exception type raised by hooks and member bodies

use crate::value::Value;

/// A user-raised exception carried through an interception pipeline.
///
/// Hooks raise exceptions by storing one on the call context; member bodies
/// raise by returning `Err`. Either way the exception reaches the original
/// caller verbatim once the current pipeline stage has finished.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct Exception {
    /// Human-readable description
    pub message: String,
    /// Optional structured payload attached by the raiser
    pub payload: Option<Value>,
}

impl Exception {
    /// Create an exception with a message and no payload
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
        }
    }

    /// Attach a payload value
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

impl From<String> for Exception {
    fn from(message: String) -> Self {
        Exception::new(message)
    }
}

impl From<&str> for Exception {
    fn from(message: &str) -> Self {
        Exception::new(message)
    }
}
