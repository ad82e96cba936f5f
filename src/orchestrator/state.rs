//! Lifecycle of one orchestrated replica set.
//!
//! ```text
//! Unstarted -> Starting -> Configuring -> Converging -> Ready
//!                  \____________\_____________\-----> Unstarted (failed start)
//! Ready <-> Degraded
//! Ready | Degraded -> Stopping -> Stopped -> Starting | Ready | Degraded
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrchestratorState {
    #[default]
    Unstarted,
    /// Node processes are being launched
    Starting,
    /// Membership is being submitted
    Configuring,
    /// Waiting for every member to report an accepted state
    Converging,
    Ready,
    /// At least one node is down
    Degraded,
    Stopping,
    Stopped,
}

impl fmt::Display for OrchestratorState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            OrchestratorState::Unstarted => write!(f, "Unstarted"),
            OrchestratorState::Starting => write!(f, "Starting"),
            OrchestratorState::Configuring => write!(f, "Configuring"),
            OrchestratorState::Converging => write!(f, "Converging"),
            OrchestratorState::Ready => write!(f, "Ready"),
            OrchestratorState::Degraded => write!(f, "Degraded"),
            OrchestratorState::Stopping => write!(f, "Stopping"),
            OrchestratorState::Stopped => write!(f, "Stopped"),
        }
    }
}

impl OrchestratorState {
    pub fn can_transition_to(
        &self,
        next: OrchestratorState,
    ) -> bool {
        use OrchestratorState::*;
        matches!(
            (self, next),
            (Unstarted | Stopped, Starting)
                | (Starting, Configuring | Unstarted)
                | (Configuring, Converging | Unstarted)
                | (Converging, Ready | Unstarted)
                | (Ready, Degraded | Stopping)
                | (Degraded, Ready | Degraded | Stopping)
                | (Stopping, Stopped)
                | (Stopped, Ready | Degraded)
        )
    }

    /// Nodes are up and role-based operations make sense
    pub fn is_running(&self) -> bool {
        matches!(self, OrchestratorState::Ready | OrchestratorState::Degraded)
    }
}
