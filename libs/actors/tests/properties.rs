//! # Mailbox and Scheduler Property Tests
//!
//! Properties that must hold for any message sequence:
//! - Delivery is FIFO and at most once
//! - A tick gives every non-empty registered actor exactly one turn
//! - Stopped actors accept nothing
//! - Runs over finite work always reach quiescence
//! - A child failure produces exactly one parent report and nothing else

use mailbox_actors::{
    ActorBehavior, ActorContext, ActorId, ActorSystem, BehaviorError, BehaviorResult, ChildFailure,
    MemorySink, Message,
};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;

/// Typed message used across the properties
#[derive(Debug, Clone, PartialEq)]
enum Msg {
    Value(i64),
    Fail(i64),
    Hop { to: usize, remaining: u32 },
    ChildFailed { child: ActorId, message: Box<Msg> },
}

impl Message for Msg {
    fn child_failed(report: ChildFailure<Self>) -> Self {
        Msg::ChildFailed {
            child: report.child,
            message: Box::new(report.message),
        }
    }
}

/// Records every message it handles; `Fail` returns an error, `Hop`
/// forwards to `peer-<to>` until `remaining` runs out
#[derive(Default)]
struct Probe {
    seen: Arc<Mutex<Vec<Msg>>>,
}

impl Probe {
    fn new() -> (Self, Arc<Mutex<Vec<Msg>>>) {
        let probe = Self::default();
        let seen = Arc::clone(&probe.seen);
        (probe, seen)
    }
}

impl ActorBehavior<Msg> for Probe {
    fn handle(&mut self, ctx: &mut ActorContext<'_, Msg>, msg: Msg) -> BehaviorResult<Msg> {
        self.seen.lock().push(msg.clone());
        match msg {
            Msg::Fail(n) => Err(BehaviorError::new(format!("fail {}", n))),
            Msg::Hop { to, remaining } if remaining > 0 => {
                let next = Msg::Hop {
                    to: (to + 1) % 3,
                    remaining: remaining - 1,
                };
                ctx.send(&format!("peer-{}", to), next);
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

fn message() -> impl Strategy<Value = Msg> {
    prop_oneof![
        3 => any::<i64>().prop_map(Msg::Value),
        1 => any::<i64>().prop_map(Msg::Fail),
    ]
}

proptest! {
    #[test]
    fn prop_mailbox_is_fifo_and_at_most_once(values in prop::collection::vec(any::<i64>(), 0..64)) {
        let mut system = ActorSystem::<Msg>::new().with_sink(MemorySink::new());
        let (probe, seen) = Probe::new();
        let id = system.create("probe", probe);

        for value in &values {
            prop_assert!(system.send("probe", Msg::Value(*value)));
        }
        prop_assert_eq!(system.message_count(id), values.len());

        let processed = system.process_all(id);
        prop_assert_eq!(processed, values.len());
        prop_assert!(system.process(id).is_idle());

        let expected: Vec<Msg> = values.into_iter().map(Msg::Value).collect();
        prop_assert_eq!(&*seen.lock(), &expected);
    }

    #[test]
    fn prop_tick_visits_each_nonempty_actor_once(loads in prop::collection::vec(0usize..6, 1..8)) {
        let mut system = ActorSystem::<Msg>::new().with_sink(MemorySink::new());
        let ids: Vec<ActorId> = loads
            .iter()
            .enumerate()
            .map(|(n, _)| system.create(format!("actor-{}", n), Probe::default()))
            .collect();

        for (n, load) in loads.iter().enumerate() {
            for value in 0..*load {
                system.send(&format!("actor-{}", n), Msg::Value(value as i64));
            }
        }

        let busy = loads.iter().filter(|load| **load > 0).count();
        prop_assert_eq!(system.tick(), busy);

        for (id, load) in ids.iter().zip(&loads) {
            prop_assert_eq!(system.message_count(*id), load.saturating_sub(1));
            prop_assert_eq!(system.processed_count(*id), u64::from(*load > 0));
        }
    }

    #[test]
    fn prop_stopped_actor_rejects_everything(
        before in prop::collection::vec(message(), 0..16),
        after in prop::collection::vec(message(), 1..16),
    ) {
        let mut system = ActorSystem::<Msg>::new().with_sink(MemorySink::new());
        let (probe, seen) = Probe::new();
        let id = system.create("probe", probe);

        for msg in before {
            system.send("probe", msg);
        }
        system.stop(id);

        for msg in after {
            prop_assert!(!system.send("probe", msg.clone()));
            prop_assert!(!system.send_to(id, msg));
        }
        prop_assert_eq!(system.message_count(id), 0);
        prop_assert!(system.process(id).is_idle());
        prop_assert_eq!(system.tick(), 0);
        prop_assert!(seen.lock().is_empty());
    }

    #[test]
    fn prop_finite_work_reaches_quiescence(
        hops in prop::collection::vec((0usize..3, 0u32..20), 0..10),
    ) {
        let mut system = ActorSystem::<Msg>::new().with_sink(MemorySink::new());
        for n in 0..3 {
            system.create(format!("peer-{}", n), Probe::default());
        }

        let mut expected = 0;
        for (start, remaining) in &hops {
            let hop = Msg::Hop {
                to: (start + 1) % 3,
                remaining: *remaining,
            };
            system.send(&format!("peer-{}", start), hop);
            expected += *remaining as usize + 1;
        }

        let report = system.run_report(10_000);
        prop_assert!(report.quiescent);
        prop_assert_eq!(report.processed, expected);
        for n in 0..3 {
            let id = system.get(&format!("peer-{}", n)).unwrap();
            prop_assert!(!system.has_messages(id));
        }
    }

    #[test]
    fn prop_child_failures_report_once(messages in prop::collection::vec(message(), 0..32)) {
        let sink = MemorySink::new();
        let mut system = ActorSystem::<Msg>::new().with_sink(sink.clone());
        let (parent_probe, parent_seen) = Probe::new();
        let parent = system.create("parent", parent_probe);
        let (child_probe, child_seen) = Probe::new();
        let child = system.spawn_child(parent, child_probe).unwrap();

        for msg in &messages {
            system.send_to(child, msg.clone());
        }
        while system.has_messages(child) {
            system.process(child);
        }
        prop_assert!(system.is_running(child));
        prop_assert_eq!(&*child_seen.lock(), &messages);

        let failures: Vec<Msg> = messages
            .iter()
            .filter(|m| matches!(m, Msg::Fail(_)))
            .cloned()
            .collect();
        prop_assert_eq!(system.message_count(parent), failures.len());
        prop_assert_eq!(sink.errors().len(), failures.len());

        system.process_all(parent);
        let reports: Vec<Msg> = failures
            .into_iter()
            .map(|m| Msg::ChildFailed { child, message: Box::new(m) })
            .collect();
        prop_assert_eq!(&*parent_seen.lock(), &reports);
    }
}
