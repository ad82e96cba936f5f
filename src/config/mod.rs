//! Configuration management for the replica set orchestrator.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support
//! - Environment variable overrides
//! - Section-wise validation
mod client;
mod convergence;
mod failover;
mod replset;
pub use client::*;
pub use convergence::*;
pub use failover::*;
pub use replset::*;

use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Prefix of environment variables that override configuration, e.g.
/// `REPLSET__REPLSET__START_PORT=32000`.
pub const ENV_PREFIX: &str = "REPLSET";

/// Main configuration container for an orchestrated replica set
///
/// Combines all section configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct OrchestratorConfig {
    /// Replica set topology, ports and on-disk layout
    #[serde(default)]
    pub replset: ReplSetConfig,
    /// Administrative client connection parameters
    #[serde(default)]
    pub client: ClientConfig,
    /// Convergence polling behaviour
    #[serde(default)]
    pub convergence: ConvergenceConfig,
    /// Defaults for step-down and targeted shutdown
    #[serde(default)]
    pub failover: FailoverConfig,
}

impl Debug for OrchestratorConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("OrchestratorConfig")
            .field("replset", &self.replset)
            .finish()
    }
}

impl OrchestratorConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Sources are merged in this order (later sources override earlier):
    /// 1. Type defaults
    /// 2. Configuration file from `CONFIG_PATH` (if set)
    /// 3. Environment variables with `REPLSET__` prefix
    ///
    /// Callers must call [`OrchestratorConfig::validate`] once all overrides
    /// are applied.
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional overrides from a file without validation.
    ///
    /// Merging order:
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.replset.validate()?;
        self.client.validate()?;
        self.convergence.validate()?;
        self.failover.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
