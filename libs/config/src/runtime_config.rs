//! Runtime Configuration Module
//!
//! Scheduler and logging settings for hosts that drive an actor system.
//! Supports loading from TOML files with environment variable overrides.

use crate::defaults;
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main runtime configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub scheduler: SchedulerSettings,
    pub logging: LoggingSettings,
}

/// Scheduling policy for an actor system
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Tick cap used by `run_default`
    pub max_iterations: usize,

    /// Mailbox capacity applied to every new actor; `None` means unbounded
    pub mailbox_capacity: Option<usize>,

    /// Delay between ticks for timer-driven hosts
    pub tick_interval_ms: u64,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// One of trace, debug, info, warn, error
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            max_iterations: defaults::scheduler::MAX_ITERATIONS,
            mailbox_capacity: None,
            tick_interval_ms: defaults::scheduler::TICK_INTERVAL_MS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: defaults::logging::LEVEL.to_string(),
            json: false,
        }
    }
}

impl LoggingSettings {
    /// Parsed log level; unknown names fall back to INFO
    pub fn tracing_level(&self) -> tracing::Level {
        match self.level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to load config file {:?}", path))
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional file, then apply `ACTORS_`
    /// environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, defaults::ENV_PREFIX)
    }

    /// Same as [`RuntimeConfig::load`] with a custom environment prefix.
    ///
    /// Nested keys are separated by a double underscore:
    /// `<PREFIX>_SCHEDULER__MAX_ITERATIONS=50`.
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading runtime config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        } else {
            debug!("No runtime config file given, using defaults");
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the scheduler cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.max_iterations == 0 {
            bail!("scheduler.max_iterations must be greater than zero");
        }

        if self.scheduler.mailbox_capacity == Some(0) {
            bail!("scheduler.mailbox_capacity must be greater than zero when set");
        }

        let level = self.logging.level.to_lowercase();
        if !defaults::logging::LEVELS.contains(&level.as_str()) {
            bail!(
                "logging.level '{}' is not one of {:?}",
                self.logging.level,
                defaults::logging::LEVELS
            );
        }

        Ok(())
    }
}

/// Convenience function to load configuration with defaults
pub fn load_config(path: Option<&Path>) -> Result<RuntimeConfig> {
    RuntimeConfig::load(path)
}
