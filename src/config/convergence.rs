use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::STATE_ARBITER;
use crate::constants::STATE_PRIMARY;
use crate::constants::STATE_SECONDARY;
use crate::ConfigurationError;
use crate::Result;

/// Convergence polling policy
///
/// There is deliberately no attempt limit here: the poller waits until the
/// replica set is healthy. Bound the wait from the outside.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConvergenceConfig {
    /// Delay between two `replSetGetStatus` attempts (unit: milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Member state codes that count as converged
    #[serde(default = "default_accepted_states")]
    pub accepted_states: Vec<i32>,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            accepted_states: default_accepted_states(),
        }
    }
}

impl ConvergenceConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigurationError::InvalidSettings("poll_interval_ms must be greater than 0".into()).into());
        }
        if self.accepted_states.is_empty() {
            return Err(ConfigurationError::InvalidSettings("accepted_states cannot be empty".into()).into());
        }
        Ok(())
    }
}

fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_accepted_states() -> Vec<i32> {
    vec![STATE_PRIMARY, STATE_SECONDARY, STATE_ARBITER]
}
