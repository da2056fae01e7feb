//! Actor System Core
//!
//! Owns every actor in an arena and schedules the registered ones
//! cooperatively. One [`ActorSystem::tick`] visits each registered actor once,
//! in registration order, and lets it handle at most one message, so a busy
//! actor cannot starve the others within a round. [`ActorSystem::run`] ticks
//! until nothing is left to do or the iteration cap is hit.
//!
//! # Failure containment
//!
//! A behavior that returns an error (or panics) fails only the message it was
//! handling. The failure is written to the log sink, the message is dropped,
//! and if the actor has a parent a single [`ChildFailure`] report is queued in
//! the parent's mailbox. The actor keeps running.
//!
//! # Ownership
//!
//! Children are referenced by [`ActorId`] in both directions: a parent lists
//! its children, a child knows its parent's id. The arena owns every actor.

use crate::actor::{ActorBehavior, ActorCell, ActorState, Processed};
use crate::context::ActorContext;
use crate::error::{BehaviorError, RejectReason, Rejected};
use crate::messages::{ChildFailure, Message};
use crate::metrics::{SystemMetrics, SystemStats};
use crate::registry::{ActorId, ActorRegistry};
use crate::sink::{LogEntry, LogLevel, LogSink, TracingSink};

use actors_config::{RuntimeConfig, SchedulerSettings};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Core actor system managing actor lifecycles and scheduling
pub struct ActorSystem<M: Message> {
    /// Every actor ever created, indexed by `ActorId`
    cells: Vec<ActorCell<M>>,

    /// Named top-level actors in scheduling order
    registry: ActorRegistry,

    /// Destination for behavior log lines and failure reports
    sink: Arc<dyn LogSink>,

    settings: SchedulerSettings,

    metrics: SystemMetrics,

    /// System ID for debugging
    system_id: String,
}

/// Summary of one `run`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Ticks executed, including the final idle one
    pub ticks: usize,
    /// Successful invocations across all ticks
    pub processed: usize,
    /// False when the iteration cap ended the run
    pub quiescent: bool,
}

impl RunReport {
    pub fn exhausted(&self) -> bool {
        !self.quiescent
    }
}

#[derive(Debug, Default)]
struct RoundOutcome {
    succeeded: usize,
    consumed: usize,
}

impl<M: Message> ActorSystem<M> {
    /// Create an actor system with default settings that logs through `tracing`
    pub fn new() -> Self {
        Self::with_settings(SchedulerSettings::default())
    }

    pub fn with_settings(settings: SchedulerSettings) -> Self {
        let system_id = format!("system-{}", Uuid::new_v4().simple());
        info!(
            system_id = %system_id,
            max_iterations = settings.max_iterations,
            mailbox_capacity = ?settings.mailbox_capacity,
            "Creating new actor system"
        );

        Self {
            cells: Vec::new(),
            registry: ActorRegistry::new(),
            sink: Arc::new(TracingSink),
            settings,
            metrics: SystemMetrics::default(),
            system_id,
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::with_settings(config.scheduler.clone())
    }

    /// Replace the log sink
    pub fn with_sink(self, sink: impl LogSink + 'static) -> Self {
        self.with_shared_sink(Arc::new(sink))
    }

    pub fn with_shared_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Create and register a top-level actor under `name`.
    ///
    /// An actor previously registered under the same name is unregistered but
    /// not stopped; it can still be driven through its id.
    pub fn create<B>(&mut self, name: impl Into<String>, behavior: B) -> ActorId
    where
        B: ActorBehavior<M>,
    {
        let capacity = self.settings.mailbox_capacity;
        self.create_with_capacity(name.into(), Box::new(behavior), capacity)
    }

    /// Like [`ActorSystem::create`] with a bounded mailbox
    pub fn create_bounded<B>(
        &mut self,
        name: impl Into<String>,
        behavior: B,
        capacity: usize,
    ) -> ActorId
    where
        B: ActorBehavior<M>,
    {
        self.create_with_capacity(name.into(), Box::new(behavior), Some(capacity))
    }

    fn create_with_capacity(
        &mut self,
        name: String,
        behavior: Box<dyn ActorBehavior<M>>,
        capacity: Option<usize>,
    ) -> ActorId {
        let id = self.insert_cell(Some(name.clone()), behavior, None, capacity);

        if let Some(previous) = self.registry.register(name.clone(), id) {
            if let Some(cell) = self.cells.get_mut(previous.index()) {
                cell.name = None;
            }
            warn!(
                system_id = %self.system_id,
                name = %name,
                previous = %previous,
                actor_id = %id,
                "Name re-registered; previous actor is no longer scheduled"
            );
        }

        info!(
            system_id = %self.system_id,
            actor_id = %id,
            name = %name,
            "Actor created"
        );

        self.start(id);
        id
    }

    /// Spawn a child of `parent`. The child is not scheduled by `tick`; drive
    /// it with [`ActorSystem::process`] or [`ActorSystem::process_all`].
    ///
    /// Returns `None` when the parent is unknown or stopped.
    pub fn spawn_child<B>(&mut self, parent: ActorId, behavior: B) -> Option<ActorId>
    where
        B: ActorBehavior<M>,
    {
        if !self.is_running(parent) {
            warn!(parent = %parent, "Cannot spawn child of a stopped or unknown actor");
            return None;
        }

        let capacity = self.settings.mailbox_capacity;
        let child = self.insert_cell(None, Box::new(behavior), Some(parent), capacity);
        if let Some(cell) = self.cells.get_mut(parent.index()) {
            cell.children.push(child);
        }

        debug!(parent = %parent, actor_id = %child, "Spawned child actor");
        self.start(child);
        Some(child)
    }

    fn insert_cell(
        &mut self,
        name: Option<String>,
        behavior: Box<dyn ActorBehavior<M>>,
        parent: Option<ActorId>,
        capacity: Option<usize>,
    ) -> ActorId {
        let id = ActorId::from_index(self.cells.len());
        self.cells.push(ActorCell::new(name, behavior, parent, capacity));
        self.metrics.record_actor_created();
        id
    }

    fn start(&mut self, id: ActorId) {
        if let Some(Err(err)) = self.invoke(id, |behavior, ctx| behavior.on_start(ctx)) {
            warn!(actor_id = %id, error = %err, "Actor failed to start");
            let line = format!("{} failed to start: {}", self.label(id), err);
            self.write_log(id, LogLevel::Error, line);
            self.stop(id);
        }
    }

    /// Look up a registered actor
    pub fn get(&self, name: &str) -> Option<ActorId> {
        self.registry.lookup(name)
    }

    /// Send to a registered actor; `false` if unknown, stopped or full
    pub fn send(&mut self, name: &str, msg: M) -> bool {
        self.try_send(name, msg).is_ok()
    }

    pub fn try_send(&mut self, name: &str, msg: M) -> Result<(), Rejected<M>> {
        match self.registry.lookup(name) {
            Some(id) => self.try_send_to(id, msg),
            None => {
                self.metrics.record_send_rejected();
                debug!(name = %name, "Send to unknown actor");
                Err(Rejected::new(msg, RejectReason::unknown(name)))
            }
        }
    }

    /// Send to any actor by id
    pub fn send_to(&mut self, id: ActorId, msg: M) -> bool {
        self.try_send_to(id, msg).is_ok()
    }

    pub fn try_send_to(&mut self, id: ActorId, msg: M) -> Result<(), Rejected<M>> {
        let Some(cell) = self.cells.get_mut(id.index()) else {
            self.metrics.record_send_rejected();
            return Err(Rejected::new(msg, RejectReason::unknown(id.to_string())));
        };

        if !cell.running {
            self.metrics.record_send_rejected();
            debug!(actor_id = %id, "Send to stopped actor rejected");
            return Err(Rejected::new(msg, RejectReason::Stopped { id }));
        }

        match cell.mailbox.push(msg) {
            Ok(()) => {
                debug!(actor_id = %id, queued = cell.mailbox.len(), "Message enqueued");
                Ok(())
            }
            Err(msg) => {
                let capacity = cell.mailbox.capacity().unwrap_or_default();
                self.metrics.record_send_rejected();
                warn!(actor_id = %id, capacity, "Mailbox full, message rejected");
                Err(Rejected::new(msg, RejectReason::MailboxFull { id, capacity }))
            }
        }
    }

    /// Handle the head message of one actor's mailbox
    pub fn process(&mut self, id: ActorId) -> Processed<M> {
        let (message, parent) = {
            let Some(cell) = self.cells.get_mut(id.index()) else {
                return Processed::Idle;
            };
            if !cell.running || cell.behavior.is_none() {
                return Processed::Idle;
            }
            match cell.mailbox.pop() {
                Some(message) => (message, cell.parent),
                None => return Processed::Idle,
            }
        };

        // Only actors with a parent need the message again for a failure report
        let failed_copy = parent.map(|_| message.clone());

        match self.invoke(id, move |behavior, ctx| behavior.handle(ctx, message)) {
            Some(Ok(reply)) => {
                self.metrics.record_message_handled();
                if let Some(cell) = self.cells.get_mut(id.index()) {
                    cell.processed += 1;
                }
                debug!(actor_id = %id, replied = reply.is_some(), "Message processed");
                Processed::Handled(reply)
            }
            Some(Err(err)) => {
                self.report_failure(id, parent, failed_copy, &err);
                Processed::Failed(err)
            }
            // behavior presence was checked before popping
            None => Processed::Idle,
        }
    }

    /// Process until the mailbox is empty, the actor stops or an invocation
    /// fails. Returns the number of successful invocations.
    ///
    /// An actor that re-queues a message for itself on every invocation keeps
    /// this loop going; use `tick`/`run` for such actors.
    pub fn process_all(&mut self, id: ActorId) -> usize {
        let mut count = 0;
        while self.process(id).is_success() {
            count += 1;
        }
        count
    }

    /// Run `f` against an actor's behavior with a fresh context, containing
    /// panics. `None` if the actor is unknown or its behavior is in flight.
    fn invoke<R>(
        &mut self,
        id: ActorId,
        f: impl FnOnce(
            &mut dyn ActorBehavior<M>,
            &mut ActorContext<'_, M>,
        ) -> Result<R, BehaviorError>,
    ) -> Option<Result<R, BehaviorError>> {
        let cell = self.cells.get_mut(id.index())?;
        let mut behavior = cell.behavior.take()?;
        let mut state = std::mem::take(&mut cell.state);

        let result = {
            let mut ctx = ActorContext::new(self, id, &mut state);
            panic::catch_unwind(AssertUnwindSafe(|| f(behavior.as_mut(), &mut ctx)))
                .unwrap_or_else(|payload| Err(BehaviorError::from_panic(payload)))
        };

        if let Some(cell) = self.cells.get_mut(id.index()) {
            cell.state = state;
            if std::mem::take(&mut cell.stop_hook_pending) {
                run_stop_hook(id, behavior.as_mut());
            }
            cell.behavior = Some(behavior);
        }

        Some(result)
    }

    fn report_failure(
        &mut self,
        id: ActorId,
        parent: Option<ActorId>,
        failed: Option<M>,
        err: &BehaviorError,
    ) {
        if let Some(cell) = self.cells.get_mut(id.index()) {
            cell.failed += 1;
        }

        warn!(
            actor_id = %id,
            system_id = %self.system_id,
            error = %err,
            panicked = err.is_panic(),
            "Actor message processing failed"
        );
        self.write_log(id, LogLevel::Error, format!("{} failed: {}", self.label(id), err));

        let reported = match (parent, failed) {
            (Some(parent), Some(message)) => {
                let report = M::child_failed(ChildFailure {
                    child: id,
                    message,
                    error: err.to_string(),
                    panicked: err.is_panic(),
                });
                match self.try_send_to(parent, report) {
                    Ok(()) => {
                        debug!(actor_id = %id, parent = %parent, "Failure reported to parent");
                        true
                    }
                    Err(rejected) => {
                        warn!(
                            actor_id = %id,
                            parent = %parent,
                            reason = %rejected.reason,
                            "Failure report could not be delivered to parent"
                        );
                        false
                    }
                }
            }
            _ => false,
        };

        self.metrics.record_behavior_failure(reported);
    }

    /// Stop an actor and, depth-first, all of its children. Queued messages
    /// are discarded. Stopping is irreversible; stopping twice is a no-op.
    pub fn stop(&mut self, id: ActorId) {
        let mut pending = vec![id];

        while let Some(next) = pending.pop() {
            let Some(cell) = self.cells.get_mut(next.index()) else {
                continue;
            };
            if !cell.running {
                continue;
            }

            cell.running = false;
            let discarded = cell.mailbox.clear();
            pending.extend(cell.children.iter().rev().copied());

            match cell.behavior.as_mut() {
                Some(behavior) => run_stop_hook(next, behavior.as_mut()),
                // in flight: the hook runs once the current invocation returns
                None => cell.stop_hook_pending = true,
            }

            self.metrics.record_actor_stopped(discarded);
            debug!(actor_id = %next, discarded, "Actor stopped");
        }
    }

    /// Give every registered actor one turn, in registration order.
    /// Returns how many actors handled a message successfully.
    pub fn tick(&mut self) -> usize {
        self.tick_round().succeeded
    }

    fn tick_round(&mut self) -> RoundOutcome {
        let mut round = RoundOutcome::default();

        for id in self.registry.ids() {
            let outcome = self.process(id);
            if outcome.is_success() {
                round.succeeded += 1;
            }
            if outcome.consumed_message() {
                round.consumed += 1;
            }
        }

        self.metrics.record_tick();
        round
    }

    /// Tick until a round consumes no message or `max_iterations` ticks ran.
    /// Returns the number of ticks executed.
    pub fn run(&mut self, max_iterations: usize) -> usize {
        self.run_report(max_iterations).ticks
    }

    /// `run` with the configured iteration cap
    pub fn run_default(&mut self) -> usize {
        self.run(self.settings.max_iterations)
    }

    pub fn run_report(&mut self, max_iterations: usize) -> RunReport {
        let mut report = RunReport {
            ticks: 0,
            processed: 0,
            quiescent: false,
        };

        while report.ticks < max_iterations {
            let round = self.tick_round();
            report.ticks += 1;
            report.processed += round.succeeded;

            if round.consumed == 0 {
                report.quiescent = true;
                break;
            }
        }

        if report.quiescent {
            debug!(
                system_id = %self.system_id,
                ticks = report.ticks,
                processed = report.processed,
                "Actor system quiescent"
            );
        } else if max_iterations > 0 {
            warn!(
                system_id = %self.system_id,
                max_iterations,
                processed = report.processed,
                "Run hit the iteration cap before quiescence"
            );
        }

        report
    }

    /// Stop every top-level actor (cascading to children) and clear the
    /// registry. Actors unregistered by a re-used name are stopped too.
    pub fn shutdown(&mut self) {
        let ids = self.registry.drain();
        info!(
            system_id = %self.system_id,
            actors = ids.len(),
            "Shutting down actor system"
        );

        for id in ids {
            self.stop(id);
        }

        // top-level actors whose name was re-registered are still running
        let orphaned: Vec<ActorId> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.running && cell.parent.is_none())
            .map(|(index, _)| ActorId::from_index(index))
            .collect();
        for id in orphaned {
            self.stop(id);
        }
    }

    pub fn is_running(&self, id: ActorId) -> bool {
        self.cells.get(id.index()).map_or(false, |cell| cell.running)
    }

    pub fn has_messages(&self, id: ActorId) -> bool {
        self.message_count(id) > 0
    }

    pub fn message_count(&self, id: ActorId) -> usize {
        self.cells.get(id.index()).map_or(0, |cell| cell.mailbox.len())
    }

    pub fn parent_of(&self, id: ActorId) -> Option<ActorId> {
        self.cells.get(id.index()).and_then(|cell| cell.parent)
    }

    pub fn children_of(&self, id: ActorId) -> &[ActorId] {
        self.cells
            .get(id.index())
            .map(|cell| cell.children.as_slice())
            .unwrap_or(&[])
    }

    /// Registry name of an actor that is still registered
    pub fn name_of(&self, id: ActorId) -> Option<&str> {
        self.cells.get(id.index()).and_then(|cell| cell.name.as_deref())
    }

    /// Read-only view of an actor's state
    pub fn state(&self, id: ActorId) -> Option<&ActorState> {
        self.cells.get(id.index()).map(|cell| &cell.state)
    }

    /// Successful invocations of one actor
    pub fn processed_count(&self, id: ActorId) -> u64 {
        self.cells.get(id.index()).map_or(0, |cell| cell.processed)
    }

    /// Failed invocations of one actor
    pub fn failure_count(&self, id: ActorId) -> u64 {
        self.cells.get(id.index()).map_or(0, |cell| cell.failed)
    }

    /// Registered names in scheduling order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    /// Number of registered actors
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Number of actors ever created, registered or not
    pub fn actor_count(&self) -> usize {
        self.cells.len()
    }

    pub fn metrics(&self) -> SystemStats {
        self.metrics.snapshot()
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    pub fn system_id(&self) -> &str {
        &self.system_id
    }

    pub(crate) fn write_log(&self, id: ActorId, level: LogLevel, line: String) {
        self.sink.write(LogEntry {
            actor: id,
            level,
            line,
        });
    }

    fn label(&self, id: ActorId) -> String {
        match self.name_of(id) {
            Some(name) => format!("Actor '{}' ({})", name, id),
            None => format!("Actor {}", id),
        }
    }
}

fn run_stop_hook<M: Message>(id: ActorId, behavior: &mut dyn ActorBehavior<M>) {
    if panic::catch_unwind(AssertUnwindSafe(|| behavior.on_stop())).is_err() {
        warn!(actor_id = %id, "Actor panicked in on_stop");
    }
}

impl<M: Message> Default for ActorSystem<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Message> fmt::Debug for ActorSystem<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorSystem")
            .field("system_id", &self.system_id)
            .field("registered", &self.registry)
            .field("actors", &self.cells.len())
            .finish_non_exhaustive()
    }
}
