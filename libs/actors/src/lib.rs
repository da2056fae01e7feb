//! Cooperative Actor Mailbox System
//!
//! Single-threaded actor runtime: every actor owns a FIFO mailbox, a
//! behavior and private state, and only runs when the scheduler hands it a
//! turn. Nothing here spawns threads or blocks.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │               ActorSystem                 │
//! │                                           │
//! │  registry (insertion order)   arena       │
//! │  "ping" ─────────────────▶ [0] Pinger     │
//! │  "pong" ─────────────────▶ [1] Ponger     │
//! │                            [2] child of 1 │
//! │                                           │
//! │  tick: visit registered actors in order,  │
//! │        one message each                   │
//! │  run:  tick until a round consumes        │
//! │        nothing or the cap is reached      │
//! └───────────────────────────────────────────┘
//! ```
//!
//! Behavior failures (errors or panics) are contained per message. A child's
//! failure is forwarded to its parent as an ordinary message built by
//! [`Message::child_failed`].
//!
//! # Examples
//!
//! ```rust
//! use mailbox_actors::recipes::{Pinger, Ponger, PING_DONE};
//! use mailbox_actors::{ActorSystem, MemorySink, Record};
//!
//! let sink = MemorySink::new();
//! let mut system = ActorSystem::<Record>::new().with_sink(sink.clone());
//! system.create("ping", Pinger::new("pong"));
//! system.create("pong", Ponger);
//!
//! system.send("ping", Record::new("start"));
//! let ticks = system.run(100);
//!
//! assert!(ticks <= 8);
//! assert!(sink.contains(PING_DONE));
//! ```

pub mod actor;
pub mod context;
pub mod error;
pub mod messages;
pub mod metrics;
pub mod recipes;
pub mod registry;
pub mod sink;
pub mod system;

pub use actor::{from_fn, ActorBehavior, ActorState, BehaviorResult, FnBehavior, Mailbox, Processed};
pub use context::ActorContext;
pub use error::{BehaviorError, RejectReason, Rejected};
pub use messages::{ChildFailure, Message, Record, ERROR_KIND};
pub use metrics::{SystemMetrics, SystemStats};
pub use registry::{ActorId, ActorRegistry};
pub use sink::{LogEntry, LogLevel, LogSink, MemorySink, TracingSink};
pub use system::{ActorSystem, RunReport};

pub use actors_config::{RuntimeConfig, SchedulerSettings};
