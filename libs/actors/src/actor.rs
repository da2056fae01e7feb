//! Actors
//!
//! An actor is a FIFO mailbox, one behavior and a private state map. The
//! behavior sees one message at a time through an [`ActorContext`]; nothing
//! outside the actor ever touches its state.

use crate::context::ActorContext;
use crate::error::BehaviorError;
use crate::messages::Message;
use crate::registry::ActorId;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::fmt;

/// Actor-local key/value state
pub type ActorState = Map<String, Value>;

/// Result of handling one message: an optional reply value
pub type BehaviorResult<M> = Result<Option<M>, BehaviorError>;

/// Trait for actor behavior
pub trait ActorBehavior<M: Message>: Send + 'static {
    /// Handle one message
    fn handle(&mut self, ctx: &mut ActorContext<'_, M>, msg: M) -> BehaviorResult<M>;

    /// Called once when the actor is created; an error stops the actor
    fn on_start(&mut self, _ctx: &mut ActorContext<'_, M>) -> Result<(), BehaviorError> {
        Ok(())
    }

    /// Called once when the actor is stopped
    fn on_stop(&mut self) {}
}

/// Closure-backed behavior, see [`from_fn`]
pub struct FnBehavior<F> {
    f: F,
}

impl<M, F> ActorBehavior<M> for FnBehavior<F>
where
    M: Message,
    F: FnMut(&mut ActorContext<'_, M>, M) -> BehaviorResult<M> + Send + 'static,
{
    fn handle(&mut self, ctx: &mut ActorContext<'_, M>, msg: M) -> BehaviorResult<M> {
        (self.f)(ctx, msg)
    }
}

/// Build a behavior from a closure
///
/// ```rust
/// use mailbox_actors::{from_fn, ActorSystem, Record};
///
/// let mut system = ActorSystem::<Record>::new();
/// let echo = system.create("echo", from_fn(|_ctx, msg: Record| Ok(Some(msg))));
/// system.send("echo", Record::new("hello"));
/// let reply = system.process(echo).into_reply().unwrap();
/// assert!(reply.is("hello"));
/// ```
pub fn from_fn<M, F>(f: F) -> FnBehavior<F>
where
    M: Message,
    F: FnMut(&mut ActorContext<'_, M>, M) -> BehaviorResult<M> + Send + 'static,
{
    FnBehavior { f }
}

/// Outcome of one `process` call
#[derive(Debug)]
pub enum Processed<M> {
    /// Nothing happened: mailbox empty or actor stopped
    Idle,
    /// A message was handled; carries the behavior's reply, if any
    Handled(Option<M>),
    /// The behavior failed; the message was dropped
    Failed(BehaviorError),
}

impl<M> Processed<M> {
    pub fn is_success(&self) -> bool {
        matches!(self, Processed::Handled(_))
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Processed::Idle)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Processed::Failed(_))
    }

    /// True when a message left the mailbox, whether or not it succeeded
    pub fn consumed_message(&self) -> bool {
        !self.is_idle()
    }

    pub fn reply(&self) -> Option<&M> {
        match self {
            Processed::Handled(reply) => reply.as_ref(),
            _ => None,
        }
    }

    pub fn into_reply(self) -> Option<M> {
        match self {
            Processed::Handled(reply) => reply,
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&BehaviorError> {
        match self {
            Processed::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// FIFO message queue, unbounded unless a capacity is given
#[derive(Debug, Clone)]
pub struct Mailbox<M> {
    queue: VecDeque<M>,
    capacity: Option<usize>,
}

impl<M> Mailbox<M> {
    pub fn unbounded() -> Self {
        Self {
            queue: VecDeque::new(),
            capacity: None,
        }
    }

    /// The bound is checked on `push`; storage grows with the queue
    pub fn bounded(capacity: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            capacity: Some(capacity),
        }
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::unbounded(),
        }
    }

    /// Append at the tail; a full mailbox hands the message back
    pub fn push(&mut self, msg: M) -> Result<(), M> {
        if self.is_full() {
            return Err(msg);
        }
        self.queue.push_back(msg);
        Ok(())
    }

    /// Remove the head message
    pub fn pop(&mut self) -> Option<M> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity.map_or(false, |cap| self.queue.len() >= cap)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Discard everything queued, returning how many messages were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }
}

/// Slot in the system arena holding one actor
pub(crate) struct ActorCell<M: Message> {
    pub(crate) name: Option<String>,
    pub(crate) mailbox: Mailbox<M>,
    /// `None` only while the behavior is running
    pub(crate) behavior: Option<Box<dyn ActorBehavior<M>>>,
    pub(crate) state: ActorState,
    pub(crate) running: bool,
    pub(crate) parent: Option<ActorId>,
    pub(crate) children: Vec<ActorId>,
    /// Stopped while its own behavior was in flight; `on_stop` runs on return
    pub(crate) stop_hook_pending: bool,
    pub(crate) processed: u64,
    pub(crate) failed: u64,
}

impl<M: Message> ActorCell<M> {
    pub(crate) fn new(
        name: Option<String>,
        behavior: Box<dyn ActorBehavior<M>>,
        parent: Option<ActorId>,
        capacity: Option<usize>,
    ) -> Self {
        Self {
            name,
            mailbox: Mailbox::with_capacity(capacity),
            behavior: Some(behavior),
            state: ActorState::new(),
            running: true,
            parent,
            children: Vec::new(),
            stop_hook_pending: false,
            processed: 0,
            failed: 0,
        }
    }
}

impl<M: Message> fmt::Debug for ActorCell<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorCell")
            .field("name", &self.name)
            .field("queued", &self.mailbox.len())
            .field("running", &self.running)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}
