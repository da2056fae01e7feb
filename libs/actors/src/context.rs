//! Actor context
//!
//! The only window a running behavior has onto the system: its own identity
//! and state, message sending, child spawning and logging.

use crate::actor::{ActorBehavior, ActorState};
use crate::error::BehaviorError;
use crate::messages::Message;
use crate::registry::ActorId;
use crate::sink::LogLevel;
use crate::system::ActorSystem;
use serde_json::Value;

/// Context provided to a behavior while it handles one message
///
/// Messages sent through the context land in the target mailbox immediately,
/// so a target that has not yet been visited in the current tick sees them in
/// the same round.
pub struct ActorContext<'a, M: Message> {
    system: &'a mut ActorSystem<M>,
    id: ActorId,
    state: &'a mut ActorState,
}

impl<'a, M: Message> ActorContext<'a, M> {
    pub(crate) fn new(
        system: &'a mut ActorSystem<M>,
        id: ActorId,
        state: &'a mut ActorState,
    ) -> Self {
        Self { system, id, state }
    }

    /// This actor's id
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Registry name, `None` for spawned children
    pub fn name(&self) -> Option<&str> {
        self.system.name_of(self.id)
    }

    pub fn parent(&self) -> Option<ActorId> {
        self.system.parent_of(self.id)
    }

    pub fn children(&self) -> &[ActorId] {
        self.system.children_of(self.id)
    }

    /// Send to a registered actor by name
    pub fn send(&mut self, name: &str, msg: M) -> bool {
        self.system.send(name, msg)
    }

    /// Send to any actor by id
    pub fn send_to(&mut self, id: ActorId, msg: M) -> bool {
        self.system.send_to(id, msg)
    }

    /// Queue a message for this actor's own future processing
    pub fn send_self(&mut self, msg: M) -> bool {
        self.system.send_to(self.id, msg)
    }

    /// Send to the parent; `false` for top-level actors
    pub fn reply_to_parent(&mut self, msg: M) -> bool {
        match self.system.parent_of(self.id) {
            Some(parent) => self.system.send_to(parent, msg),
            None => false,
        }
    }

    /// Spawn a child owned by this actor
    ///
    /// Returns `None` if this actor already stopped itself during the
    /// current invocation.
    pub fn spawn<B>(&mut self, behavior: B) -> Option<ActorId>
    where
        B: ActorBehavior<M>,
    {
        self.system.spawn_child(self.id, behavior)
    }

    /// Stop one of this actor's own children
    pub fn stop_child(&mut self, child: ActorId) -> bool {
        if !self.system.children_of(self.id).contains(&child) {
            return false;
        }
        self.system.stop(child);
        true
    }

    /// Stop this actor and its children; the current message still completes
    pub fn stop_self(&mut self) {
        self.system.stop(self.id);
    }

    pub fn is_running(&self) -> bool {
        self.system.is_running(self.id)
    }

    pub fn state(&self) -> &ActorState {
        &*self.state
    }

    pub fn state_mut(&mut self) -> &mut ActorState {
        &mut *self.state
    }

    /// Read a state value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Read an integer state value, treating absence as zero
    pub fn get_i64(&self, key: &str) -> i64 {
        self.state.get(key).and_then(Value::as_i64).unwrap_or(0)
    }

    /// Write a state value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.state.insert(key.into(), value.into());
    }

    /// Add `delta` to an integer state value and return the new total.
    /// On overflow the stored value is left unchanged.
    pub fn add_i64(&mut self, key: &str, delta: i64) -> Result<i64, BehaviorError> {
        let current = self.get_i64(key);
        let total = current.checked_add(delta).ok_or_else(|| {
            BehaviorError::new(format!("'{}' overflows: {} + {}", key, current, delta))
        })?;
        self.state.insert(key.to_string(), Value::from(total));
        Ok(total)
    }

    /// Write a line to the system's log sink
    pub fn log(&self, line: impl Into<String>) {
        self.system.write_log(self.id, LogLevel::Info, line.into());
    }

    pub fn log_error(&self, line: impl Into<String>) {
        self.system.write_log(self.id, LogLevel::Error, line.into());
    }
}
