//! Poll loop timing

use std::time::Duration;

/// Timing of the poll loop
///
/// The defaults are the intervals the loop has always used; they are exposed
/// so callers (and tests) can shorten them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before the first poll, so the initial snapshot fires no callbacks
    /// Default: 10 seconds
    pub warmup: Duration,

    /// Pause after dispatching a non-empty batch
    /// Default: 1 second
    pub batch_interval: Duration,

    /// Pause after a failed poll before trying again
    /// Default: 60 seconds
    pub retry_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            warmup: Duration::from_secs(10),
            batch_interval: Duration::from_secs(1),
            retry_interval: Duration::from_secs(60),
        }
    }
}

impl PollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_batch_interval(mut self, interval: Duration) -> Self {
        self.batch_interval = interval;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }
}
