//! Per-call options. Unset fields fall back to the orchestrator configuration.

/// Options for [`ReplicaSetOrchestrator::start`](super::ReplicaSetOrchestrator::start)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Wipe every node's data directory first. Defaults to
    /// `replset.purge_on_start`.
    pub purge: Option<bool>,
}

/// Options for [`ReplicaSetOrchestrator::shutdown`](super::ReplicaSetOrchestrator::shutdown)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownOptions {
    /// Signal in `kill` notation. Defaults to `failover.shutdown_signal`.
    pub signal: Option<i32>,
}

impl ShutdownOptions {
    pub fn signal(signal: i32) -> Self {
        Self { signal: Some(signal) }
    }
}

/// Options for [`ReplicaSetOrchestrator::step_down`](super::ReplicaSetOrchestrator::step_down)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepDownOptions {
    /// Seconds the stepped-down primary may not be re-elected
    pub avoid_election_for: Option<u64>,
    /// Step down even without an electable secondary
    pub force: Option<bool>,
}
