//! # Actor Runtime Configuration
//!
//! Configuration and defaults for hosts that drive a cooperative actor
//! system: the scheduler's tick cap, optional mailbox bound and logging.
//!
//! ## Usage
//!
//! ```rust
//! use actors_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_toml_str("[scheduler]\nmax_iterations = 50\n").unwrap();
//! assert_eq!(config.scheduler.max_iterations, 50);
//! assert_eq!(config.logging.level, "info");
//! ```

pub mod defaults;
pub mod runtime_config;

// Re-export commonly used types
pub use runtime_config::{load_config, LoggingSettings, RuntimeConfig, SchedulerSettings};
