use std::collections::BTreeMap;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::NodeSpec;
use super::NodeStatus;
use crate::Result;

/// Options for starting (or re-starting) a node process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStartOptions {
    /// Remove the node's data directory before launching
    pub purge: bool,
    /// Caller supplied flags, passed through untouched
    pub extra: BTreeMap<String, String>,
}

impl NodeStartOptions {
    pub fn purge(purge: bool) -> Self {
        Self {
            purge,
            ..Default::default()
        }
    }
}

/// Options for stopping a node process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStopOptions {
    /// Signal in `kill` notation, e.g. `-15` or `-9`
    pub signal: i32,
}

impl Default for NodeStopOptions {
    fn default() -> Self {
        Self { signal: -15 }
    }
}

/// Lifecycle of a single data store process.
///
/// Implementations own the process. The orchestrator only holds a reference
/// through its node handle and never shares it.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NodeManager: Send + Sync {
    /// Launches the process; resolves once the node accepts connections
    async fn start(
        &self,
        options: NodeStartOptions,
    ) -> Result<()>;

    /// Terminates the process with the requested signal
    async fn stop(
        &self,
        options: NodeStopOptions,
    ) -> Result<()>;

    /// Stops then starts the process
    async fn restart(
        &self,
        options: NodeStartOptions,
    ) -> Result<()>;

    /// Whether the manager currently holds a live connection to its node
    fn is_connected(&self) -> bool;

    /// Queries the node for a fresh identity view (`isMaster`)
    async fn is_master(&self) -> Result<NodeStatus>;
}

/// Creates the manager responsible for a freshly planned node.
pub trait NodeManagerFactory: Send + Sync {
    fn create(
        &self,
        spec: &NodeSpec,
    ) -> Box<dyn NodeManager>;
}

impl<F> NodeManagerFactory for F
where
    F: Fn(&NodeSpec) -> Box<dyn NodeManager> + Send + Sync,
{
    fn create(
        &self,
        spec: &NodeSpec,
    ) -> Box<dyn NodeManager> {
        self(spec)
    }
}
