//! Runtime configuration shared by every Thing registered on a [`Runtime`](crate::runtime::Runtime).

use std::time::Duration;

use serde::Deserialize;

/// What `request_action` does when a Thing's action queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum Backpressure {
    /// Fail immediately with `Overloaded`.
    #[default]
    Reject,
    /// Wait up to `wait_timeout_ms` for a free slot, then fail with `Overloaded`.
    Wait { wait_timeout_ms: u64 },
}

/// Knobs of the Thing runtime. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Prefix of every href in descriptors, e.g. `/things`.
    pub base_path: String,
    /// Match property, action and event names case-insensitively.
    pub ignore_case: bool,
    /// Submitted actions waiting for a worker, per Thing.
    pub action_queue_capacity: usize,
    /// Action bodies executing concurrently, per Thing.
    pub action_workers: usize,
    pub backpressure: Backpressure,
    /// Messages buffered per subscriber channel.
    pub subscriber_buffer: usize,
    /// How long a stalled subscriber may block delivery before it is detached.
    pub subscriber_send_timeout_ms: u64,
    /// Messages a subscriber may have waiting for delivery before it is detached.
    pub subscriber_backlog: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_path: "/things".to_string(),
            ignore_case: false,
            action_queue_capacity: 64,
            action_workers: 4,
            backpressure: Backpressure::default(),
            subscriber_buffer: 32,
            subscriber_send_timeout_ms: 1000,
            subscriber_backlog: crate::hub::DEFAULT_BACKLOG,
        }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn subscriber_send_timeout(&self) -> Duration {
        Duration::from_millis(self.subscriber_send_timeout_ms)
    }

    /// `base_path` without its trailing slash.
    #[must_use]
    pub fn href_prefix(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }

    /// List every problem with this configuration.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.action_queue_capacity == 0 {
            problems.push("action_queue_capacity must be greater than 0".to_string());
        }
        if self.action_workers == 0 {
            problems.push("action_workers must be greater than 0".to_string());
        }
        if self.subscriber_buffer == 0 {
            problems.push("subscriber_buffer must be greater than 0".to_string());
        }
        if self.subscriber_backlog == 0 {
            problems.push("subscriber_backlog must be greater than 0".to_string());
        }
        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            problems.push(format!("base_path must start with '/', got {:?}", self.base_path));
        }
        problems
    }
}
