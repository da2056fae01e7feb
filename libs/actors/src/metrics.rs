//! System metrics
//!
//! Plain counters; the system is single-threaded so no atomics are needed.

use serde::Serialize;

/// Counters maintained by an [`crate::ActorSystem`]
#[derive(Debug, Default, Clone)]
pub struct SystemMetrics {
    actors_created: u64,
    actors_stopped: u64,
    messages_processed: u64,
    behavior_failures: u64,
    failures_reported: u64,
    sends_rejected: u64,
    messages_discarded: u64,
    ticks: u64,
}

impl SystemMetrics {
    pub fn record_actor_created(&mut self) {
        self.actors_created += 1;
    }

    /// Record an actor stop and the queued messages it dropped
    pub fn record_actor_stopped(&mut self, discarded: usize) {
        self.actors_stopped += 1;
        self.messages_discarded += discarded as u64;
    }

    pub fn record_message_handled(&mut self) {
        self.messages_processed += 1;
    }

    /// Record a failed invocation and whether a parent was notified
    pub fn record_behavior_failure(&mut self, reported: bool) {
        self.behavior_failures += 1;
        if reported {
            self.failures_reported += 1;
        }
    }

    pub fn record_send_rejected(&mut self) {
        self.sends_rejected += 1;
    }

    pub fn record_tick(&mut self) {
        self.ticks += 1;
    }

    /// Share of invocations that failed, in percent
    pub fn failure_rate(&self) -> f64 {
        let invocations = self.messages_processed + self.behavior_failures;
        if invocations == 0 {
            return 0.0;
        }
        (self.behavior_failures as f64 / invocations as f64) * 100.0
    }

    pub fn snapshot(&self) -> SystemStats {
        SystemStats {
            actors_created: self.actors_created,
            actors_stopped: self.actors_stopped,
            messages_processed: self.messages_processed,
            behavior_failures: self.behavior_failures,
            failures_reported: self.failures_reported,
            sends_rejected: self.sends_rejected,
            messages_discarded: self.messages_discarded,
            ticks: self.ticks,
            failure_rate: self.failure_rate(),
        }
    }
}

/// Point-in-time copy of the system counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStats {
    pub actors_created: u64,
    pub actors_stopped: u64,
    pub messages_processed: u64,
    pub behavior_failures: u64,
    pub failures_reported: u64,
    pub sends_rejected: u64,
    pub messages_discarded: u64,
    pub ticks: u64,
    pub failure_rate: f64,
}
