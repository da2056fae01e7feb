//! # Scheduler Integration Tests
//!
//! Round-robin ticks, run termination, registration order and
//! configuration-driven system construction.

use mailbox_actors::{
    from_fn, ActorContext, ActorSystem, BehaviorError, BehaviorResult, MemorySink, Record,
    RuntimeConfig,
};
use std::fs;
use tempfile::tempdir;

/// Logs `"<name>:<kind>"` for every message, fails on kind "fail", and
/// forwards to `forward` if present
fn tracer(
) -> impl FnMut(&mut ActorContext<'_, Record>, Record) -> BehaviorResult<Record> + Send + 'static {
    |ctx: &mut ActorContext<'_, Record>, msg: Record| {
        let name = ctx.name().unwrap_or("?").to_string();
        let kind = msg.kind().unwrap_or("?").to_string();
        ctx.log(format!("{}:{}", name, kind));

        if kind == "fail" {
            return Err(BehaviorError::new("failed on purpose"));
        }
        if let Some(target) = msg.get_str("forward") {
            ctx.send(target, Record::new(kind));
        }
        Ok(None)
    }
}

fn traced_system() -> (ActorSystem<Record>, MemorySink) {
    let sink = MemorySink::new();
    (ActorSystem::new().with_sink(sink.clone()), sink)
}

#[test]
fn test_tick_gives_each_actor_one_turn() {
    let (mut system, sink) = traced_system();
    let busy = system.create("busy", from_fn(tracer()));
    let quiet = system.create("quiet", from_fn(tracer()));

    for n in 0..5 {
        system.send("busy", Record::new(format!("job{}", n)));
    }
    system.send("quiet", Record::new("only"));

    assert_eq!(system.tick(), 2);
    assert_eq!(system.message_count(busy), 4);
    assert_eq!(system.message_count(quiet), 0);
    assert_eq!(sink.lines(), vec!["busy:job0", "quiet:only"]);

    assert_eq!(system.tick(), 1);
}

#[test]
fn test_messages_to_later_actors_handled_same_tick() {
    let (mut system, sink) = traced_system();
    system.create("first", from_fn(tracer()));
    system.create("second", from_fn(tracer()));

    system.send("first", Record::new("a").with("forward", "second"));
    assert_eq!(system.tick(), 2);
    assert_eq!(sink.lines(), vec!["first:a", "second:a"]);

    sink.clear();
    system.send("second", Record::new("b").with("forward", "first"));
    assert_eq!(system.tick(), 1);
    assert_eq!(system.tick(), 1);
    assert_eq!(sink.lines(), vec!["second:b", "first:b"]);
}

#[test]
fn test_run_on_idle_system() {
    let (mut system, _) = traced_system();
    assert_eq!(system.run(100), 1);

    system.create("idle", from_fn(tracer()));
    let report = system.run_report(100);
    assert_eq!(report.ticks, 1);
    assert_eq!(report.processed, 0);
    assert!(report.quiescent);
}

#[test]
fn test_failures_do_not_end_run() {
    let (mut system, sink) = traced_system();
    let id = system.create("flaky", from_fn(tracer()));

    system.send("flaky", Record::new("fail"));
    system.send("flaky", Record::new("fail"));
    system.send("flaky", Record::new("ok"));

    let report = system.run_report(100);
    assert!(report.quiescent);
    assert_eq!(report.processed, 1);
    assert_eq!(report.ticks, 4);
    assert!(!system.has_messages(id));
    assert!(system.is_running(id));
    assert_eq!(sink.errors().len(), 2);

    let stats = system.metrics();
    assert_eq!(stats.behavior_failures, 2);
    assert_eq!(stats.failures_reported, 0);
}

#[test]
fn test_overwritten_name_keeps_slot() {
    let (mut system, sink) = traced_system();
    system.create("a", from_fn(tracer()));
    system.create("b", from_fn(tracer()));
    system.create("a", from_fn(tracer()));

    assert_eq!(system.names().collect::<Vec<_>>(), vec!["a", "b"]);

    system.send("a", Record::new("x"));
    system.send("b", Record::new("y"));
    system.tick();
    assert_eq!(sink.lines(), vec!["a:x", "b:y"]);
    assert_eq!(system.actor_count(), 3);
}

#[test]
fn test_ping_forever_hits_cap() {
    let (mut system, _) = traced_system();
    system.create(
        "left",
        from_fn(|ctx: &mut ActorContext<'_, Record>, msg: Record| {
            ctx.send("right", msg);
            Ok(None)
        }),
    );
    system.create(
        "right",
        from_fn(|ctx: &mut ActorContext<'_, Record>, msg: Record| {
            ctx.send("left", msg);
            Ok(None)
        }),
    );

    system.send("left", Record::new("ball"));
    let report = system.run_report(10);
    assert_eq!(report.ticks, 10);
    assert!(report.exhausted());
}

#[test]
fn test_shutdown_then_run() {
    let (mut system, _) = traced_system();
    system.create("a", from_fn(tracer()));
    system.send("a", Record::new("left-behind"));

    system.shutdown();
    assert!(system.is_empty());
    assert!(!system.send("a", Record::new("late")));
    assert_eq!(system.run(100), 1);
    assert_eq!(system.metrics().messages_discarded, 1);
}

#[test]
fn test_system_from_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("actors.toml");
    fs::write(
        &path,
        "[scheduler]\nmax_iterations = 3\nmailbox_capacity = 2\n\n[logging]\nlevel = \"debug\"\n",
    )
    .unwrap();

    let config = RuntimeConfig::from_file(&path).unwrap();
    let mut system = ActorSystem::<Record>::from_config(&config);
    assert_eq!(system.settings().max_iterations, 3);

    system.create(
        "echo",
        from_fn(|ctx: &mut ActorContext<'_, Record>, msg: Record| {
            ctx.send_self(msg);
            Ok(None)
        }),
    );
    assert!(system.send("echo", Record::new("a")));
    assert!(system.send("echo", Record::new("b")));
    assert!(!system.send("echo", Record::new("c")));

    assert_eq!(system.run_default(), 3);
}
