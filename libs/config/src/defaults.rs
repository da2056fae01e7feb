//! Runtime defaults
//!
//! Default values used when a configuration file or environment override
//! leaves a setting unspecified.

/// Prefix for environment overrides, e.g. `ACTORS_SCHEDULER__MAX_ITERATIONS=50`
pub const ENV_PREFIX: &str = "ACTORS";

/// Scheduler defaults
pub mod scheduler {
    /// Tick cap for `ActorSystem::run_default`; guards against actors that
    /// message each other forever
    pub const MAX_ITERATIONS: usize = 100;

    /// Delay between ticks when a host drives the system from a timer
    pub const TICK_INTERVAL_MS: u64 = 10;
}

/// Logging defaults
pub mod logging {
    pub const LEVEL: &str = "info";

    /// Levels accepted by `LoggingSettings::level`
    pub const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
}
