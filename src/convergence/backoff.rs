use std::time::Duration;

/// Delay strategy between two convergence attempts.
pub trait Backoff: Send + Sync {
    /// Delay to wait after failed attempt number `attempt` (1-based)
    fn delay(
        &self,
        attempt: u64,
    ) -> Duration;
}

/// Same delay after every attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff {
    interval: Duration,
}

impl FixedBackoff {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Backoff for FixedBackoff {
    fn delay(
        &self,
        _attempt: u64,
    ) -> Duration {
        self.interval
    }
}
