use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::state::SimState;
use crate::NodeManager;
use crate::NodeStartOptions;
use crate::NodeStatus;
use crate::NodeStopOptions;
use crate::Result;

/// [`NodeManager`] backed by a [`SimulatedReplicaSet`](super::SimulatedReplicaSet) node
pub struct SimulatedNodeManager {
    state: Arc<Mutex<SimState>>,
    name: String,
}

impl SimulatedNodeManager {
    pub(super) fn new(
        state: Arc<Mutex<SimState>>,
        name: String,
    ) -> Self {
        Self { state, name }
    }
}

#[async_trait]
impl NodeManager for SimulatedNodeManager {
    async fn start(
        &self,
        options: NodeStartOptions,
    ) -> Result<()> {
        self.state.lock().start_node(&self.name, options)
    }

    async fn stop(
        &self,
        options: NodeStopOptions,
    ) -> Result<()> {
        self.state.lock().stop_node(&self.name, options.signal)
    }

    async fn restart(
        &self,
        options: NodeStartOptions,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if state.node(&self.name).map(|n| n.connected).unwrap_or(false) {
            state.stop_node(&self.name, NodeStopOptions::default().signal)?;
        }
        state.start_node(&self.name, options)
    }

    fn is_connected(&self) -> bool {
        self.state.lock().node(&self.name).map(|n| n.connected).unwrap_or(false)
    }

    async fn is_master(&self) -> Result<NodeStatus> {
        self.state.lock().is_master(&self.name)
    }
}
