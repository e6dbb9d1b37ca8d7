//! # Runtime configuration.
//!
//! Provides [`Config`], the settings consumed by [`Lifecycle::builder`](crate::Lifecycle::builder).
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → clamped to 1
//! - `poll_interval = 0s` → clamped to 1ms so the poll loop never spins

use std::time::Duration;

/// Configuration for the output serializer and the progress supervisor.
///
/// ## Field semantics
/// - `queue_capacity`: pending messages before producers start waiting (backpressure)
/// - `poll_interval`: time between two supervisor ticks
/// - `cancel_keyword`: stdin line (case-insensitive) that requests cancellation
/// - `watch_signals`: whether the supervisor listens for OS termination signals
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the bounded message queue.
    ///
    /// When full, `progress`/`info`/`prompt`/`exit` wait for the consumer to catch up.
    pub queue_capacity: usize,

    /// Fixed cadence of the progress supervisor.
    ///
    /// A pending cancellation is observed at the start of the next tick, so this
    /// is also the worst-case cancellation latency.
    pub poll_interval: Duration,

    /// Keyword that cancels the job when typed on stdin in non-interactive mode.
    pub cancel_keyword: String,

    /// Install OS signal listeners (SIGINT/SIGTERM/SIGQUIT, Ctrl-C) when supervision starts.
    ///
    /// Once installed, those signals no longer kill the process; they are routed
    /// to `WorkController::cancel` instead.
    pub watch_signals: bool,
}

impl Config {
    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Returns the poll interval clamped to a minimum of 1ms.
    #[inline]
    pub fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }

    /// True if `line` is the cancel keyword (ASCII case-insensitive).
    #[inline]
    pub fn is_cancel_keyword(&self, line: &str) -> bool {
        line.eq_ignore_ascii_case(&self.cancel_keyword)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `queue_capacity = 1000`
    /// - `poll_interval = 2s`
    /// - `cancel_keyword = "cancel"`
    /// - `watch_signals = true`
    fn default() -> Self {
        Self {
            queue_capacity: 1000,
            poll_interval: Duration::from_secs(2),
            cancel_keyword: "cancel".to_string(),
            watch_signals: true,
        }
    }
}
