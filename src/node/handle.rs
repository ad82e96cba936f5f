use tracing::debug;
use tracing::warn;

use super::NodeManager;
use super::NodeRole;
use super::NodeSpec;
use super::NodeStartOptions;
use super::NodeStatus;
use super::NodeStopOptions;
use crate::Result;

/// Last administrative state observed for one node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastKnownState {
    pub connected: bool,
    pub role: NodeRole,
    /// Self-reported address
    pub me: Option<String>,
}

/// Binds a [`NodeSpec`] to its [`NodeManager`] and caches what the node last
/// reported about itself.
///
/// Every mutating method takes `&mut self`, so two refreshes of the same node
/// can never be in flight at once.
pub struct NodeHandle {
    spec: NodeSpec,
    manager: Box<dyn NodeManager>,
    last_known: LastKnownState,
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("NodeHandle")
            .field("node", &self.spec.name())
            .field("last_known", &self.last_known)
            .finish()
    }
}

impl NodeHandle {
    pub fn new(
        spec: NodeSpec,
        manager: Box<dyn NodeManager>,
    ) -> Self {
        Self {
            spec,
            manager,
            last_known: LastKnownState::default(),
        }
    }

    pub fn spec(&self) -> &NodeSpec {
        &self.spec
    }

    pub fn name(&self) -> String {
        self.spec.name()
    }

    pub fn last_known(&self) -> &LastKnownState {
        &self.last_known
    }

    /// Live connectivity, straight from the manager
    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    /// True when this node reported `address` as its own, or is registered
    /// under it.
    pub fn answers_to(
        &self,
        address: &str,
    ) -> bool {
        self.last_known.me.as_deref() == Some(address) || self.spec.name() == address
    }

    pub async fn start(
        &mut self,
        options: NodeStartOptions,
    ) -> Result<()> {
        debug!(node = %self.spec.name(), purge = options.purge, "starting node");
        let result = self.manager.start(options).await;
        self.last_known.connected = self.manager.is_connected();
        result
    }

    /// Stops the node. The cached role is kept so a downed node can later be
    /// found by what it used to be.
    pub async fn stop(
        &mut self,
        options: NodeStopOptions,
    ) -> Result<()> {
        debug!(node = %self.spec.name(), signal = options.signal, "stopping node");
        let result = self.manager.stop(options).await;
        self.last_known.connected = self.manager.is_connected();
        result
    }

    /// Asks the node who it is and who the primary is, updating the cache.
    pub async fn refresh(&mut self) -> Result<NodeStatus> {
        match self.manager.is_master().await {
            Ok(status) => {
                self.last_known.connected = self.manager.is_connected();
                self.last_known.role = status.role;
                if status.me.is_some() {
                    self.last_known.me = status.me.clone();
                }
                Ok(status)
            }
            Err(e) => {
                warn!(node = %self.spec.name(), "status refresh failed: {}", e);
                self.last_known.connected = self.manager.is_connected();
                Err(e)
            }
        }
    }
}
