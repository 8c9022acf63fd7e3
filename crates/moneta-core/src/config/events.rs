//! Event dispatch configuration.

use serde::{Deserialize, Serialize};

/// Behavior when the dispatch queue is full.
///
/// `DropAndLog` preserves request latency but loses the event (logged and
/// dead-lettered); `CallerRuns` publishes inline on the caller's task,
/// preserving delivery at a latency cost. The default is `DropAndLog`:
/// a financial write is never held hostage to notification fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Drop the event, log it, and feed it to the dead-letter sink.
    DropAndLog,
    /// Publish inline on the caller's task.
    CallerRuns,
}

/// Event dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Number of concurrent publish workers.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Capacity of the dispatch queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// What to do when the dispatch queue is full.
    #[serde(default = "default_overflow_policy")]
    pub overflow_policy: OverflowPolicy,
    /// Logical channel all activity events are published to.
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Seconds to wait for in-flight publishes during shutdown.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
    /// Maximum events retained in the dead-letter sink.
    #[serde(default = "default_dead_letter_capacity")]
    pub dead_letter_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            overflow_policy: default_overflow_policy(),
            channel: default_channel(),
            shutdown_grace_seconds: default_shutdown_grace(),
            dead_letter_capacity: default_dead_letter_capacity(),
        }
    }
}

fn default_workers() -> usize {
    3
}

fn default_queue_capacity() -> usize {
    256
}

fn default_overflow_policy() -> OverflowPolicy {
    OverflowPolicy::DropAndLog
}

fn default_channel() -> String {
    "activity-events".to_string()
}

fn default_shutdown_grace() -> u64 {
    30
}

fn default_dead_letter_capacity() -> usize {
    512
}
