//! Actor Messages
//!
//! The core treats messages as opaque values handed verbatim to behaviors.
//! The only thing it needs from a message type is a way to wrap a child's
//! failure so the report can travel through the parent's mailbox like any
//! other message.
//!
//! [`Record`] is a ready-made dynamic message: a JSON object carrying a
//! `"type"` discriminator plus payload keys.

use crate::error::BehaviorError;
use crate::registry::ActorId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Message types accepted by an [`crate::ActorSystem`]
pub trait Message: Clone + fmt::Debug + Send + 'static {
    /// Wrap a child's failed invocation for delivery to its parent
    fn child_failed(report: ChildFailure<Self>) -> Self
    where
        Self: Sized;
}

/// Report of one failed behavior invocation in a child actor
#[derive(Debug, Clone, PartialEq)]
pub struct ChildFailure<M> {
    /// Child whose behavior failed
    pub child: ActorId,
    /// The message that was being handled; it is not retried
    pub message: M,
    /// Rendered behavior error
    pub error: String,
    /// Whether the behavior panicked rather than returning an error
    pub panicked: bool,
}

/// Message type discriminator used for failure reports
pub const ERROR_KIND: &str = "error";

/// Dynamic key/value message with a `"type"` discriminator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Create a record of the given kind
    pub fn new(kind: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("type".to_string(), Value::String(kind.into()));
        Self { fields }
    }

    /// Builder-style payload insertion
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Parse from a JSON value; only objects are records
    pub fn from_value(value: Value) -> Result<Self, BehaviorError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(BehaviorError::new(format!(
                "expected a JSON object message, got {}",
                other
            ))),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// The `"type"` discriminator, if present
    pub fn kind(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind() == Some(kind)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(Value::as_i64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Integer payload that the behavior cannot do without
    pub fn require_i64(&self, key: &str) -> Result<i64, BehaviorError> {
        self.get_i64(key).ok_or_else(|| {
            BehaviorError::new(format!(
                "message {:?} is missing integer field '{}'",
                self.kind().unwrap_or("<untyped>"),
                key
            ))
        })
    }

    /// String payload that the behavior cannot do without
    pub fn require_str(&self, key: &str) -> Result<&str, BehaviorError> {
        self.get_str(key).ok_or_else(|| {
            BehaviorError::new(format!(
                "message {:?} is missing string field '{}'",
                self.kind().unwrap_or("<untyped>"),
                key
            ))
        })
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.fields.clone()))
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

impl Message for Record {
    fn child_failed(report: ChildFailure<Self>) -> Self {
        Record::new(ERROR_KIND)
            .with("child", report.child.to_string())
            .with("message", report.message)
            .with("error", report.error)
            .with("panicked", report.panicked)
    }
}
