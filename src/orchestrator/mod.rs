//! Replica set lifecycle orchestration.
//!
//! [`ReplicaSetOrchestrator`] owns the node handles of one replica set and
//! drives them through provisioning, membership submission and convergence.
//! Once the set is ready it answers role-based queries and injects failures
//! (targeted shutdown, restart of downed members, forced step-down) for
//! client test suites.
//!
//! ## Example
//! ```ignore
//! let mut orchestrator = OrchestratorBuilder::from_config(config)
//!     .node_factory(Arc::new(managers))
//!     .client_factory(Arc::new(clients))
//!     .build()?;
//!
//! orchestrator.start(StartOptions::default()).await?;
//! let victim = orchestrator.shutdown(NodeRole::Secondary, ShutdownOptions::default()).await?;
//! orchestrator.restart_server(NodeRole::Secondary, NodeStartOptions::default()).await?;
//! orchestrator.stop().await?;
//! ```

mod builder;
mod options;
mod selection;
mod state;

pub use builder::*;
pub use options::*;
pub use state::*;


use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::build_membership;
use crate::open_client;
use crate::plan_nodes;
use crate::run_admin_command;
use crate::utils::async_task::join_all_best_effort;
use crate::utils::async_task::join_all_or_first_error;
use crate::AdminCommand;
use crate::Backoff;
use crate::ClientOptions;
use crate::ClusterClientFactory;
use crate::CommandOptions;
use crate::ConvergencePoller;
use crate::Document;
use crate::Error;
use crate::MembershipDocument;
use crate::NodeHandle;
use crate::NodeManagerFactory;
use crate::NodeRole;
use crate::NodeSpec;
use crate::NodeStartOptions;
use crate::NodeStopOptions;
use crate::OrchestratorConfig;
use crate::Result;
use crate::Topology;

pub struct ReplicaSetOrchestrator {
    config: OrchestratorConfig,
    node_factory: Arc<dyn NodeManagerFactory>,
    client_factory: Arc<dyn ClusterClientFactory>,
    backoff: Arc<dyn Backoff>,
    cancel: CancellationToken,

    handles: Vec<NodeHandle>,
    state: OrchestratorState,
    /// Version of the next membership document
    config_version: u64,
    /// Last membership accepted by `replSetInitiate`
    membership: Option<MembershipDocument>,
}

impl std::fmt::Debug for ReplicaSetOrchestrator {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ReplicaSetOrchestrator")
            .field("repl_set", &self.config.replset.name)
            .field("state", &self.state)
            .field("config_version", &self.config_version)
            .field("handles", &self.handles)
            .finish()
    }
}

impl ReplicaSetOrchestrator {
    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn config_version(&self) -> u64 {
        self.config_version
    }

    pub fn membership(&self) -> Option<&MembershipDocument> {
        self.membership.as_ref()
    }

    pub fn nodes(&self) -> &[NodeHandle] {
        &self.handles
    }

    pub fn node(
        &self,
        ordinal: usize,
    ) -> Option<&NodeHandle> {
        self.handles.get(ordinal)
    }

    /// Token that aborts a convergence wait in progress. Once a wait has been
    /// cancelled the orchestrator issues a fresh token for the next `start`.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Provisions every node, submits the membership and waits until the set
    /// converges.
    ///
    /// On any failure the nodes started so far are stopped (best effort) and
    /// the orchestrator returns to `Unstarted`.
    #[instrument(skip(self), fields(repl_set = %self.config.replset.name))]
    pub async fn start(
        &mut self,
        options: StartOptions,
    ) -> Result<()> {
        self.transition(OrchestratorState::Starting, "start")?;

        match self.bring_up(options).await {
            Ok(()) => {
                self.set_state(OrchestratorState::Ready);
                info!(nodes = self.handles.len(), "replica set ready");
                Ok(())
            }
            Err(e) => {
                error!("start failed: {}", e);
                self.abandon_start().await;
                if self.cancel.is_cancelled() {
                    self.cancel = CancellationToken::new();
                }
                self.set_state(OrchestratorState::Unstarted);
                Err(e)
            }
        }
    }

    async fn bring_up(
        &mut self,
        options: StartOptions,
    ) -> Result<()> {
        let replset = &self.config.replset;
        let specs = plan_nodes(replset)?;
        let membership = build_membership(
            &replset.name,
            self.config_version,
            &specs,
            Topology::from_config(replset),
        )?;

        let purge = options.purge.unwrap_or(replset.purge_on_start);
        self.handles = specs
            .into_iter()
            .map(|spec| {
                let manager = self.node_factory.create(&spec);
                NodeHandle::new(spec, manager)
            })
            .collect();

        join_all_or_first_error(
            self.handles
                .iter_mut()
                .map(|handle| handle.start(NodeStartOptions::purge(purge))),
        )
        .await?;
        debug!(nodes = self.handles.len(), "all nodes started");

        self.set_state(OrchestratorState::Configuring);
        let seed = self
            .handles
            .first()
            .map(|h| h.spec().address.clone())
            .ok_or(Error::NoServersAvailable)?;
        let mut client = open_client(self.client_factory.as_ref(), &seed, &self.client_options()).await?;

        let initiate = AdminCommand::ReplSetInitiate(membership.clone());
        let initiate_options = CommandOptions {
            read_preference: Some(self.config.client.initiate_read_preference.clone()),
        };
        if let Err(e) = run_admin_command(client.as_mut(), &initiate, initiate_options).await {
            client.close().await;
            return Err(e);
        }
        info!(seed = %seed, version = membership.version, "membership submitted");
        self.membership = Some(membership);

        self.set_state(OrchestratorState::Converging);
        let poller = ConvergencePoller::new(self.backoff.clone(), self.config.convergence.accepted_states.clone())
            .with_cancellation(self.cancel.child_token());
        match poller.wait(client.as_mut()).await {
            Ok(report) => debug!(
                attempts = report.attempts,
                primary = report.snapshot.primary().unwrap_or("none"),
                "converged"
            ),
            Err(e) => {
                client.close().await;
                return Err(e);
            }
        }

        selection::refresh_connected(&mut self.handles).await;
        Ok(())
    }

    async fn abandon_start(&mut self) {
        let started = self
            .handles
            .iter_mut()
            .filter(|h| h.is_connected())
            .map(|h| h.stop(NodeStopOptions::default()));
        if let Err(e) = join_all_best_effort("start cleanup", started).await {
            warn!("cleanup after failed start incomplete: {}", e);
        }
        self.handles.clear();
        self.membership = None;
    }

    /// Stops every node. All nodes are attempted even when some fail.
    #[instrument(skip(self), fields(repl_set = %self.config.replset.name))]
    pub async fn stop(&mut self) -> Result<()> {
        self.transition(OrchestratorState::Stopping, "stop")?;

        let result = join_all_best_effort(
            "stop",
            self.handles
                .iter_mut()
                .map(|handle| handle.stop(NodeStopOptions::default())),
        )
        .await;

        self.set_state(OrchestratorState::Stopped);
        info!("replica set stopped");
        result
    }

    /// Starts the nodes that are currently down. Returns at once when every
    /// node is connected.
    #[instrument(skip(self), fields(repl_set = %self.config.replset.name))]
    pub async fn restart(
        &mut self,
        options: NodeStartOptions,
    ) -> Result<()> {
        if !matches!(
            self.state,
            OrchestratorState::Ready | OrchestratorState::Degraded | OrchestratorState::Stopped
        ) {
            return Err(self.invalid_state("restart"));
        }

        let downed: Vec<&mut NodeHandle> = self.handles.iter_mut().filter(|h| !h.is_connected()).collect();
        if downed.is_empty() {
            debug!("no disconnected node to restart");
            return Ok(());
        }
        info!(nodes = downed.len(), "restarting disconnected nodes");

        let result = join_all_best_effort(
            "restart",
            downed.into_iter().map(|handle| handle.start(options.clone())),
        )
        .await;

        selection::refresh_connected(&mut self.handles).await;
        self.settle();
        result
    }

    /// Stops the first connected node whose live role is `role` and returns
    /// its spec.
    ///
    /// # Errors
    /// `NoServersAvailable` when nothing is connected, `NoEligibleNode` when
    /// no connected node currently has that role.
    #[instrument(skip(self, options), fields(repl_set = %self.config.replset.name))]
    pub async fn shutdown(
        &mut self,
        role: NodeRole,
        options: ShutdownOptions,
    ) -> Result<NodeSpec> {
        self.ensure_running("shutdown")?;

        let index = selection::select_connected_by_role(&mut self.handles, role).await?;
        let signal = options.signal.unwrap_or(self.config.failover.shutdown_signal);

        let handle = &mut self.handles[index];
        handle.stop(NodeStopOptions { signal }).await?;
        info!(node = %handle.name(), %role, signal, "node shut down");

        let spec = handle.spec().clone();
        self.set_state(OrchestratorState::Degraded);
        Ok(spec)
    }

    /// Starts the first downed node whose last known role was `role` and
    /// returns its spec.
    #[instrument(skip(self, options), fields(repl_set = %self.config.replset.name))]
    pub async fn restart_server(
        &mut self,
        role: NodeRole,
        options: NodeStartOptions,
    ) -> Result<NodeSpec> {
        self.ensure_running("restart_server")?;

        let index = selection::find_downed_by_role(&self.handles, role)?;
        let handle = &mut self.handles[index];
        handle.start(options).await?;
        info!(node = %handle.name(), %role, "node restarted");

        if let Err(e) = handle.refresh().await {
            debug!("restarted node not answering yet: {}", e);
        }
        let spec = handle.spec().clone();
        self.settle();
        Ok(spec)
    }

    /// Asks the current primary to step down and returns its reply.
    ///
    /// A rejection comes back as [`Error::AdminCommand`] carrying the reply
    /// exactly as the store sent it. Nothing is retried.
    #[instrument(skip(self), fields(repl_set = %self.config.replset.name))]
    pub async fn step_down(
        &mut self,
        options: StepDownOptions,
    ) -> Result<Document> {
        self.ensure_running("step_down")?;

        let index = selection::locate_primary(&mut self.handles).await?;
        let address = self.handles[index].spec().address.clone();

        let command = AdminCommand::ReplSetStepDown {
            avoid_election_for_secs: options
                .avoid_election_for
                .unwrap_or(self.config.failover.avoid_election_for_secs),
            force: options.force.unwrap_or(self.config.failover.force_step_down),
        };

        let mut client = open_client(self.client_factory.as_ref(), &address, &self.client_options()).await?;
        let result = run_admin_command(client.as_mut(), &command, CommandOptions::default()).await;
        client.close().await;

        match &result {
            Ok(_) => {
                info!(primary = %address, "primary stepped down");
                selection::refresh_connected(&mut self.handles).await;
            }
            Err(e) => warn!(primary = %address, "step down refused: {}", e),
        }
        result
    }

    fn client_options(&self) -> ClientOptions {
        ClientOptions {
            connect_timeout: self.config.client.connect_timeout(),
        }
    }

    /// Ready when every node is connected, Degraded otherwise.
    fn settle(&mut self) {
        let next = if self.handles.iter().all(|h| h.is_connected()) {
            OrchestratorState::Ready
        } else {
            OrchestratorState::Degraded
        };
        if self.state != next {
            self.set_state(next);
        }
    }

    fn ensure_running(
        &self,
        operation: &'static str,
    ) -> Result<()> {
        if self.state.is_running() {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    fn transition(
        &mut self,
        next: OrchestratorState,
        operation: &'static str,
    ) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(self.invalid_state(operation));
        }
        self.set_state(next);
        Ok(())
    }

    fn set_state(
        &mut self,
        next: OrchestratorState,
    ) {
        debug!(from = %self.state, to = %next, "state transition");
        self.state = next;
    }

    fn invalid_state(
        &self,
        operation: &'static str,
    ) -> Error {
        Error::InvalidState {
            operation,
            state: self.state.to_string(),
        }
    }
}
