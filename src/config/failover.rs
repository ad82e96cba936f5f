use serde::Deserialize;
use serde::Serialize;

use crate::ConfigurationError;
use crate::Result;

/// Defaults applied to failover operations when the caller leaves an option
/// unset
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FailoverConfig {
    /// Seconds a stepped-down primary may not be re-elected
    #[serde(default = "default_avoid_election_for_secs")]
    pub avoid_election_for_secs: u64,

    /// Step down even when no secondary is electable
    #[serde(default)]
    pub force_step_down: bool,

    /// Signal sent to a node stopped through `shutdown`
    #[serde(default = "default_shutdown_signal")]
    pub shutdown_signal: i32,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            avoid_election_for_secs: default_avoid_election_for_secs(),
            force_step_down: false,
            shutdown_signal: default_shutdown_signal(),
        }
    }
}

impl FailoverConfig {
    pub fn validate(&self) -> Result<()> {
        if self.avoid_election_for_secs == 0 {
            return Err(
                ConfigurationError::InvalidSettings("avoid_election_for_secs must be greater than 0".into()).into(),
            );
        }
        Ok(())
    }
}

fn default_avoid_election_for_secs() -> u64 {
    90
}
// SIGTERM, written the way `kill -15` takes it
fn default_shutdown_signal() -> i32 {
    -15
}
