//! Fluent construction of a [`ReplicaSetOrchestrator`].
//!
//! The builder collects the two external collaborators (node managers and
//! administrative clients) plus optional overrides for the convergence
//! backoff and cancellation token. Configuration is validated once in
//! [`OrchestratorBuilder::build`].
//!
//! ## Example
//! ```ignore
//! let orchestrator = OrchestratorBuilder::new(Some("config/replset.toml"))?
//!     .node_factory(Arc::new(managers))
//!     .client_factory(Arc::new(clients))
//!     .backoff(Arc::new(FixedBackoff::new(Duration::from_millis(200))))
//!     .build()?;
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::OrchestratorState;
use super::ReplicaSetOrchestrator;
use crate::constants::INITIAL_CONFIG_VERSION;
use crate::Backoff;
use crate::ClusterClientFactory;
use crate::ConfigurationError;
use crate::FixedBackoff;
use crate::NodeManagerFactory;
use crate::OrchestratorConfig;
use crate::ReplSetConfig;
use crate::Result;

pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    node_factory: Option<Arc<dyn NodeManagerFactory>>,
    client_factory: Option<Arc<dyn ClusterClientFactory>>,
    backoff: Option<Arc<dyn Backoff>>,
    cancel: Option<CancellationToken>,
}

impl OrchestratorBuilder {
    /// Loads configuration from defaults, `CONFIG_PATH` and the environment,
    /// then applies `override_path` when given.
    pub fn new(override_path: Option<&str>) -> Result<Self> {
        let mut config = OrchestratorConfig::new()?;
        if let Some(path) = override_path {
            info!("with_override_config from: {}", path);
            config = config.with_override_config(path)?;
        }
        Ok(Self::from_config(config))
    }

    /// Starts from an in-memory configuration
    pub fn from_config(config: OrchestratorConfig) -> Self {
        Self {
            config,
            node_factory: None,
            client_factory: None,
            backoff: None,
            cancel: None,
        }
    }

    /// Replaces only the replica set section, keeping the rest of `config`
    pub fn replset(
        mut self,
        replset: ReplSetConfig,
    ) -> Self {
        self.config.replset = replset;
        self
    }

    pub fn node_factory(
        mut self,
        factory: Arc<dyn NodeManagerFactory>,
    ) -> Self {
        self.node_factory = Some(factory);
        self
    }

    pub fn client_factory(
        mut self,
        factory: Arc<dyn ClusterClientFactory>,
    ) -> Self {
        self.client_factory = Some(factory);
        self
    }

    /// Overrides the fixed `convergence.poll_interval_ms` delay
    pub fn backoff(
        mut self,
        backoff: Arc<dyn Backoff>,
    ) -> Self {
        self.backoff = Some(backoff);
        self
    }

    pub fn cancellation(
        mut self,
        token: CancellationToken,
    ) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validates the configuration and assembles an `Unstarted` orchestrator.
    pub fn build(self) -> Result<ReplicaSetOrchestrator> {
        let config = self.config.validate()?;

        let node_factory = self
            .node_factory
            .ok_or_else(|| ConfigurationError::InvalidSettings("node manager factory not set".into()))?;
        let client_factory = self
            .client_factory
            .ok_or_else(|| ConfigurationError::InvalidSettings("cluster client factory not set".into()))?;
        let backoff = self
            .backoff
            .unwrap_or_else(|| Arc::new(FixedBackoff::new(config.convergence.poll_interval())));

        Ok(ReplicaSetOrchestrator {
            config,
            node_factory,
            client_factory,
            backoff,
            cancel: self.cancel.unwrap_or_default(),
            handles: Vec::new(),
            state: OrchestratorState::Unstarted,
            config_version: INITIAL_CONFIG_VERSION,
            membership: None,
        })
    }
}
