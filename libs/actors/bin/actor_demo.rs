//! Actor system demo driver
//!
//! Usage:
//!   actor_demo --scenario ping-pong
//!   actor_demo --scenario worker-pool --config config/actors.toml
//!   actor_demo --scenario counter --log-level debug

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use mailbox_actors::recipes::{kinds, Counter, Pinger, Ponger, ResultCollector, Worker};
use mailbox_actors::{ActorSystem, Record, RuntimeConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const WORKERS: usize = 3;
const JOBS: i64 = 9;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    PingPong,
    Counter,
    WorkerPool,
}

#[derive(Parser, Debug)]
#[command(name = "actor_demo")]
#[command(about = "Drive a cooperative actor system through a sample scenario")]
#[command(version)]
struct Args {
    /// Scenario to run
    #[arg(short, long, value_enum, default_value = "ping-pong")]
    scenario: Scenario,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Delay between ticks; overrides the config file
    #[arg(long)]
    tick_interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        RuntimeConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(interval) = args.tick_interval_ms {
        config.scheduler.tick_interval_ms = interval;
    }
    config.validate()?;

    init_logging(&config);
    info!(scenario = ?args.scenario, "Starting actor demo");

    let mut system = ActorSystem::<Record>::from_config(&config);
    match args.scenario {
        Scenario::PingPong => setup_ping_pong(&mut system),
        Scenario::Counter => setup_counter(&mut system),
        Scenario::WorkerPool => setup_worker_pool(&mut system),
    }

    let ticks = drive(&mut system, &config).await;
    summarize(&mut system, args.scenario)?;

    system.shutdown();
    let stats = system.metrics();
    info!(ticks, "Actor demo finished");
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}

fn init_logging(config: &RuntimeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.tracing_level().as_str()));

    if config.logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn setup_ping_pong(system: &mut ActorSystem<Record>) {
    system.create("ping", Pinger::new("pong"));
    system.create("pong", Ponger);
    system.send("ping", Record::new(kinds::START));
}

fn setup_counter(system: &mut ActorSystem<Record>) {
    system.create("counter", Counter);
    for kind in [kinds::INCREMENT, kinds::INCREMENT, kinds::INCREMENT, kinds::DECREMENT] {
        system.send("counter", Record::new(kind));
    }
}

fn setup_worker_pool(system: &mut ActorSystem<Record>) {
    for n in 0..WORKERS {
        system.create(format!("worker-{}", n), Worker::new("collector"));
    }
    system.create("collector", ResultCollector);

    for job in 0..JOBS {
        let worker = format!("worker-{}", job as usize % WORKERS);
        let work = Record::new(kinds::WORK).with("job", job).with("input", job + 1);
        system.send(&worker, work);
    }
}

/// Tick on a timer until the system is quiescent, the iteration cap is hit
/// or Ctrl+C arrives
async fn drive(system: &mut ActorSystem<Record>, config: &RuntimeConfig) -> usize {
    let period = Duration::from_millis(config.scheduler.tick_interval_ms.max(1));
    let mut interval = tokio::time::interval(period);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut ticks = 0;
    while ticks < config.scheduler.max_iterations {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => {
                info!("Received shutdown signal");
                break;
            }
        }

        let round = system.run_report(1);
        ticks += round.ticks;
        if round.quiescent {
            return ticks;
        }
    }

    warn!(ticks, "Stopped before the system went quiet");
    ticks
}

fn summarize(system: &mut ActorSystem<Record>, scenario: Scenario) -> Result<()> {
    match scenario {
        Scenario::PingPong => {
            let ping = system.get("ping").context("ping actor missing")?;
            let count = system.state(ping).and_then(|s| s.get("count")).cloned();
            info!(count = ?count, "Ping/pong exchange complete");
        }
        Scenario::Counter => {
            let counter = system.get("counter").context("counter actor missing")?;
            system.send("counter", Record::new(kinds::GET));
            let reply = system.process(counter).into_reply().context("counter did not reply")?;
            info!(count = ?reply.get_i64("count"), "Counter value");
        }
        Scenario::WorkerPool => {
            let collector = system.get("collector").context("collector actor missing")?;
            let results = system
                .state(collector)
                .and_then(|s| s.get("results"))
                .and_then(|v| v.as_array())
                .map_or(0, Vec::len);
            for n in 0..WORKERS {
                let name = format!("worker-{}", n);
                if let Some(id) = system.get(&name) {
                    info!(worker = %name, processed = system.processed_count(id), "Worker done");
                }
            }
            info!(results, "Worker pool complete");
        }
    }
    Ok(())
}
