//! Actor Error Types
//!
//! Failures raised by behaviors and rejections produced by mailbox delivery.
//! Neither kind ever escapes the scheduler: behavior failures are contained at
//! the `process` boundary and rejections are reported as `false` / `Err`.

use crate::registry::ActorId;
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Failure raised while a behavior handled one message
#[derive(Error, Debug)]
#[error("{message}")]
pub struct BehaviorError {
    message: String,
    panicked: bool,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BehaviorError {
    /// Create a behavior error from a description
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            panicked: false,
            source: None,
        }
    }

    /// Create a behavior error wrapping an underlying cause
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            panicked: false,
            source: Some(Box::new(source)),
        }
    }

    /// Build from the payload of a caught panic
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&'static str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "behavior panicked".to_string()
        };

        Self {
            message,
            panicked: true,
            source: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True when the failure was a panic rather than a returned error
    pub fn is_panic(&self) -> bool {
        self.panicked
    }
}

impl From<anyhow::Error> for BehaviorError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{:#}", err))
    }
}

impl From<serde_json::Error> for BehaviorError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source("message payload error", err)
    }
}

/// Why a mailbox refused a message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("unknown actor: {name}")]
    UnknownActor { name: String },

    #[error("actor {id} is stopped")]
    Stopped { id: ActorId },

    #[error("mailbox of {id} is full ({capacity} messages)")]
    MailboxFull { id: ActorId, capacity: usize },
}

impl RejectReason {
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownActor { name: name.into() }
    }

    /// Rejections that may succeed on a later attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, RejectReason::MailboxFull { .. })
    }
}

/// A refused send, handing the message back to the caller
#[derive(Error)]
#[error("message rejected: {reason}")]
pub struct Rejected<M> {
    pub message: M,
    pub reason: RejectReason,
}

impl<M> Rejected<M> {
    pub fn new(message: M, reason: RejectReason) -> Self {
        Self { message, reason }
    }

    pub fn into_message(self) -> M {
        self.message
    }
}

impl<M> fmt::Debug for Rejected<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_messages() {
        let err = BehaviorError::from_panic(Box::new("boom"));
        assert_eq!(err.message(), "boom");
        assert!(err.is_panic());

        let err = BehaviorError::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(err.message(), "owned boom");

        let err = BehaviorError::from_panic(Box::new(42_u8));
        assert_eq!(err.message(), "behavior panicked");
    }

    #[test]
    fn test_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = BehaviorError::with_source("flush failed", io);
        assert_eq!(err.to_string(), "flush failed");
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_panic());
    }

    #[test]
    fn test_reject_reason_display() {
        let reason = RejectReason::unknown("ghost");
        assert_eq!(reason.to_string(), "unknown actor: ghost");
        assert!(!reason.is_transient());

        let full = RejectReason::MailboxFull {
            id: ActorId::from_index(3),
            capacity: 2,
        };
        assert!(full.is_transient());
        assert_eq!(full.to_string(), "mailbox of actor-3 is full (2 messages)");
    }
}
