//! Ready-made behaviors over [`Record`] messages
//!
//! Small building blocks used by the demo driver and the scenario tests:
//! a counter, a ping/pong pair, a doubling worker and a result collector.

use crate::actor::{ActorBehavior, BehaviorResult};
use crate::context::ActorContext;
use crate::error::BehaviorError;
use crate::messages::{Record, ERROR_KIND};
use serde_json::Value;

/// Message kinds understood by the recipes
pub mod kinds {
    pub const INCREMENT: &str = "increment";
    pub const DECREMENT: &str = "decrement";
    pub const GET: &str = "get";
    pub const COUNT: &str = "count";
    pub const START: &str = "start";
    pub const PING: &str = "ping";
    pub const PONG: &str = "pong";
    pub const WORK: &str = "work";
    pub const RESULT: &str = "result";
}

/// Line logged by [`Pinger`] once the exchange completes
pub const PING_DONE: &str = "Ping: Done!";

fn unexpected(msg: &Record) -> BehaviorError {
    BehaviorError::new(format!("unexpected message: {}", msg))
}

/// Integer counter kept in state under `"count"`
///
/// `get` replies with `{type: count, count: n}`; if the request carries a
/// `reply_to` name the same record is also sent there.
#[derive(Debug, Default, Clone, Copy)]
pub struct Counter;

impl ActorBehavior<Record> for Counter {
    fn handle(
        &mut self,
        ctx: &mut ActorContext<'_, Record>,
        msg: Record,
    ) -> BehaviorResult<Record> {
        match msg.kind() {
            Some(kinds::INCREMENT) => {
                let by = msg.get_i64("by").unwrap_or(1);
                ctx.add_i64("count", by)?;
                Ok(None)
            }
            Some(kinds::DECREMENT) => {
                let by = msg.get_i64("by").unwrap_or(1);
                let delta = by
                    .checked_neg()
                    .ok_or_else(|| BehaviorError::new(format!("cannot decrement by {}", by)))?;
                ctx.add_i64("count", delta)?;
                Ok(None)
            }
            Some(kinds::GET) => {
                let reply = Record::new(kinds::COUNT).with("count", ctx.get_i64("count"));
                if let Some(target) = msg.get_str("reply_to") {
                    ctx.send(target, reply.clone());
                }
                Ok(Some(reply))
            }
            _ => Err(unexpected(&msg)),
        }
    }
}

/// Starts and drives a ping/pong exchange with the actor named `partner`
#[derive(Debug, Clone)]
pub struct Pinger {
    partner: String,
    rounds: i64,
}

impl Pinger {
    pub fn new(partner: impl Into<String>) -> Self {
        Self {
            partner: partner.into(),
            rounds: 3,
        }
    }

    /// Number of pongs to wait for before finishing
    pub fn rounds(mut self, rounds: i64) -> Self {
        self.rounds = rounds;
        self
    }

    fn ping(&self, ctx: &mut ActorContext<'_, Record>, count: i64) -> Result<(), BehaviorError> {
        let me = ctx.name().unwrap_or_default().to_string();
        let ping = Record::new(kinds::PING).with("count", count).with("reply_to", me);
        if !ctx.send(&self.partner, ping) {
            return Err(BehaviorError::new(format!(
                "ping partner '{}' is not reachable",
                self.partner
            )));
        }
        Ok(())
    }
}

impl ActorBehavior<Record> for Pinger {
    fn handle(
        &mut self,
        ctx: &mut ActorContext<'_, Record>,
        msg: Record,
    ) -> BehaviorResult<Record> {
        match msg.kind() {
            Some(kinds::START) => {
                ctx.set("count", 0);
                self.ping(ctx, 1)?;
            }
            Some(kinds::PONG) => {
                let count = msg.require_i64("count")?;
                ctx.set("count", count);
                if count < self.rounds {
                    self.ping(ctx, count + 1)?;
                } else {
                    ctx.log(PING_DONE);
                }
            }
            _ => return Err(unexpected(&msg)),
        }
        Ok(None)
    }
}

/// Answers every ping with a pong carrying the same count
#[derive(Debug, Default, Clone, Copy)]
pub struct Ponger;

impl ActorBehavior<Record> for Ponger {
    fn handle(
        &mut self,
        ctx: &mut ActorContext<'_, Record>,
        msg: Record,
    ) -> BehaviorResult<Record> {
        if !msg.is(kinds::PING) {
            return Err(unexpected(&msg));
        }

        let count = msg.require_i64("count")?;
        let reply_to = msg.require_str("reply_to")?;
        ctx.add_i64("received", 1)?;
        ctx.log(format!("Pong: {}", count));
        ctx.send(reply_to, Record::new(kinds::PONG).with("count", count));
        Ok(None)
    }
}

/// Doubles `input` of each `work` message and sends the result to a collector
#[derive(Debug, Clone)]
pub struct Worker {
    collector: String,
}

impl Worker {
    pub fn new(collector: impl Into<String>) -> Self {
        Self {
            collector: collector.into(),
        }
    }
}

impl ActorBehavior<Record> for Worker {
    fn handle(
        &mut self,
        ctx: &mut ActorContext<'_, Record>,
        msg: Record,
    ) -> BehaviorResult<Record> {
        if !msg.is(kinds::WORK) {
            return Err(unexpected(&msg));
        }

        let input = msg.require_i64("input")?;
        let output = input
            .checked_mul(2)
            .ok_or_else(|| BehaviorError::new(format!("input {} overflows", input)))?;
        ctx.add_i64("processed", 1)?;

        let worker = match ctx.name() {
            Some(name) => name.to_string(),
            None => ctx.id().to_string(),
        };
        let mut result = Record::new(kinds::RESULT)
            .with("worker", worker)
            .with("input", input)
            .with("output", output);
        if let Some(job) = msg.get("job") {
            result = result.with("job", job.clone());
        }

        let target = msg.get_str("reply_to").unwrap_or(&self.collector).to_string();
        if !ctx.send(&target, result.clone()) {
            ctx.log_error(format!("result for input {} not delivered to '{}'", input, target));
        }
        Ok(Some(result))
    }
}

/// Appends every `result` to the `"results"` array in state; child failure
/// reports go to `"failures"`
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultCollector;

impl ResultCollector {
    fn append(ctx: &mut ActorContext<'_, Record>, key: &str, msg: Record) {
        match ctx.state_mut().get_mut(key) {
            Some(Value::Array(items)) => items.push(msg.into_value()),
            _ => ctx.set(key, Value::Array(vec![msg.into_value()])),
        }
    }
}

impl ActorBehavior<Record> for ResultCollector {
    fn handle(
        &mut self,
        ctx: &mut ActorContext<'_, Record>,
        msg: Record,
    ) -> BehaviorResult<Record> {
        match msg.kind() {
            Some(kinds::RESULT) => Self::append(ctx, "results", msg),
            Some(ERROR_KIND) => Self::append(ctx, "failures", msg),
            _ => return Err(unexpected(&msg)),
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::system::ActorSystem;

    #[test]
    fn test_counter_reply_to() {
        let mut system = ActorSystem::<Record>::new();
        let counter = system.create("counter", Counter);
        let collector = system.create("inbox", ResultCollector);

        system.send("counter", Record::new(kinds::INCREMENT).with("by", 5));
        system.send("counter", Record::new(kinds::GET).with("reply_to", "inbox"));
        assert_eq!(system.process_all(counter), 2);

        // counts are not results
        assert!(system.process(collector).is_failed());
    }

    #[test]
    fn test_counter_overflow_fails_message() {
        let mut system = ActorSystem::<Record>::new();
        let counter = system.create("counter", Counter);

        system.send("counter", Record::new(kinds::INCREMENT).with("by", i64::MAX));
        system.send("counter", Record::new(kinds::INCREMENT));
        system.send("counter", Record::new(kinds::DECREMENT).with("by", i64::MIN));

        assert!(system.process(counter).is_success());

        let outcome = system.process(counter);
        assert!(outcome.error().unwrap().message().contains("overflows"));
        assert!(!outcome.error().unwrap().is_panic());
        assert_eq!(system.state(counter).unwrap()["count"], i64::MAX);

        let outcome = system.process(counter);
        assert!(outcome.error().unwrap().message().contains("cannot decrement"));
        assert_eq!(system.state(counter).unwrap()["count"], i64::MAX);
        assert!(system.is_running(counter));
    }

    #[test]
    fn test_counter_rejects_unknown() {
        let mut system = ActorSystem::<Record>::new();
        let counter = system.create("counter", Counter);
        system.send("counter", Record::new("reset"));

        let outcome = system.process(counter);
        assert!(outcome.error().unwrap().message().contains("reset"));
    }

    #[test]
    fn test_pinger_unreachable_partner() {
        let sink = MemorySink::new();
        let mut system = ActorSystem::<Record>::new().with_sink(sink.clone());
        let ping = system.create("ping", Pinger::new("nobody"));
        system.send("ping", Record::new(kinds::START));

        assert!(system.process(ping).is_failed());
        assert!(sink.errors()[0].line.contains("nobody"));
    }

    #[test]
    fn test_worker_requires_input() {
        let mut system = ActorSystem::<Record>::new();
        let worker = system.create("worker", Worker::new("collector"));
        system.send("worker", Record::new(kinds::WORK));

        assert!(system.process(worker).is_failed());
        assert_eq!(system.state(worker).unwrap().get("processed"), None);
    }

    #[test]
    fn test_worker_reply() {
        let mut system = ActorSystem::<Record>::new();
        let worker = system.create("worker", Worker::new("collector"));
        let collector = system.create("collector", ResultCollector);
        system.send("worker", Record::new(kinds::WORK).with("input", 21).with("job", 0));

        let reply = system.process(worker).into_reply().unwrap();
        assert_eq!(reply.get_i64("output"), Some(42));
        assert_eq!(reply.get_str("worker"), Some("worker"));

        system.process(collector);
        let results = system.state(collector).unwrap()["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["job"], 0);
    }

    #[test]
    fn test_collector_records_child_failures() {
        let mut system = ActorSystem::<Record>::new();
        let collector = system.create("collector", ResultCollector);
        let worker = system.spawn_child(collector, Worker::new("collector")).unwrap();
        system.send_to(worker, Record::new(kinds::WORK).with("input", "two"));

        assert!(system.process(worker).is_failed());
        assert!(system.process(collector).is_success());

        let failures = system.state(collector).unwrap()["failures"].as_array().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0]["message"]["input"], "two");
    }
}
