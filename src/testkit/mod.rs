//! In-memory replica set for exercising the orchestrator without processes.
//!
//! [`SimulatedReplicaSet`] hands out node managers and administrative clients
//! that all share one scripted cluster state. Nodes come up when started,
//! take their roles once `replSetInitiate` is accepted and answer
//! `replSetGetStatus`, `replSetStepDown` and `isMaster` the way a small
//! replica set would. Tests can inject failures and inspect what the
//! orchestrator did.
//!
//! ```ignore
//! let cluster = SimulatedReplicaSet::new();
//! let orchestrator = OrchestratorBuilder::from_config(config)
//!     .node_factory(Arc::new(cluster.clone()))
//!     .client_factory(Arc::new(cluster.clone()))
//!     .build()?;
//! ```

mod client;
mod manager;
mod state;

pub use client::*;
pub use manager::*;


use std::sync::Arc;

use parking_lot::Mutex;

use self::state::SimState;
use crate::ClientEvent;
use crate::ClientOptions;
use crate::ClusterClient;
use crate::ClusterClientFactory;
use crate::Document;
use crate::NodeAddress;
use crate::NodeManager;
use crate::NodeManagerFactory;
use crate::NodeRole;
use crate::NodeSpec;
use crate::NodeStartOptions;

/// Command received by a simulated node
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommand {
    pub address: String,
    pub namespace: String,
    pub document: Document,
    pub read_preference: Option<String>,
}

/// Shared handle to one simulated replica set. Cloning shares the state.
#[derive(Debug, Clone, Default)]
pub struct SimulatedReplicaSet {
    inner: Arc<Mutex<SimState>>,
}

impl SimulatedReplicaSet {
    pub fn new() -> Self {
        Self::default()
    }

    // -
    // Scripting

    /// `replSetGetStatus` reports members as still syncing for the next `polls` queries
    pub fn delay_convergence(
        &self,
        polls: u32,
    ) {
        self.inner.lock().pending_sync_polls = polls;
    }

    /// Every start of `node` fails
    pub fn fail_start(
        &self,
        node: &str,
    ) {
        self.inner.lock().start_failures.insert(node.to_string());
    }

    /// Every stop of `node` fails
    pub fn fail_stop(
        &self,
        node: &str,
    ) {
        self.inner.lock().stop_failures.insert(node.to_string());
    }

    /// The next connect to `node` reports `event` instead of the live state
    pub fn script_connect(
        &self,
        node: &str,
        event: ClientEvent,
    ) {
        self.inner.lock().connect_events.insert(node.to_string(), event);
    }

    /// `replSetInitiate` answers with `reply` instead of accepting
    pub fn reject_initiate(
        &self,
        reply: Document,
    ) {
        self.inner.lock().initiate_rejection = Some(reply);
    }

    /// `replSetStepDown` answers with `reply` instead of stepping down
    pub fn reject_step_down(
        &self,
        reply: Document,
    ) {
        self.inner.lock().step_down_rejection = Some(reply);
    }

    /// Marks `node` as down without going through its manager, as if the
    /// process crashed.
    pub fn crash(
        &self,
        node: &str,
    ) {
        self.inner.lock().take_down(node);
    }

    // -
    // Inspection

    pub fn node_names(&self) -> Vec<String> {
        self.inner.lock().order.clone()
    }

    pub fn is_connected(
        &self,
        node: &str,
    ) -> bool {
        self.inner.lock().node(node).map(|n| n.connected).unwrap_or(false)
    }

    pub fn role_of(
        &self,
        node: &str,
    ) -> NodeRole {
        self.inner.lock().node(node).map(|n| n.role).unwrap_or_default()
    }

    pub fn primary(&self) -> Option<String> {
        self.inner.lock().primary()
    }

    /// Signals `node` was stopped with, oldest first
    pub fn signals(
        &self,
        node: &str,
    ) -> Vec<i32> {
        self.inner.lock().node(node).map(|n| n.signals.clone()).unwrap_or_default()
    }

    /// Options of every successful start of `node`, oldest first
    pub fn starts(
        &self,
        node: &str,
    ) -> Vec<NodeStartOptions> {
        self.inner.lock().node(node).map(|n| n.starts.clone()).unwrap_or_default()
    }

    /// Membership accepted by `replSetInitiate`, if any
    pub fn initiated_config(&self) -> Option<Document> {
        self.inner.lock().initiated.clone()
    }

    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.inner.lock().commands.clone()
    }

    /// Commands whose first key is `name`
    pub fn commands_named(
        &self,
        name: &str,
    ) -> Vec<RecordedCommand> {
        self.commands()
            .into_iter()
            .filter(|c| c.document.as_object().and_then(|o| o.keys().next()).map(String::as_str) == Some(name))
            .collect()
    }

    /// Clients opened and not yet closed
    pub fn open_clients(&self) -> usize {
        self.inner.lock().open_clients
    }
}

impl NodeManagerFactory for SimulatedReplicaSet {
    fn create(
        &self,
        spec: &NodeSpec,
    ) -> Box<dyn NodeManager> {
        self.inner.lock().register(spec);
        Box::new(SimulatedNodeManager::new(self.inner.clone(), spec.name()))
    }
}

impl ClusterClientFactory for SimulatedReplicaSet {
    fn create(
        &self,
        address: &NodeAddress,
        _options: &ClientOptions,
    ) -> Box<dyn ClusterClient> {
        Box::new(SimulatedClient::new(self.inner.clone(), address.name()))
    }
}
