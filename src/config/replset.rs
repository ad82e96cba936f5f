use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_BIN;
use crate::constants::DEFAULT_HOST;
use crate::constants::DEFAULT_REPL_SET_NAME;
use crate::constants::DEFAULT_SECONDARIES;
use crate::constants::DEFAULT_START_PORT;
use crate::constants::ORCHESTRATOR_ONLY_OPTIONS;
use crate::ConfigurationError;
use crate::Result;

/// Topology and per-node layout of the replica set under test
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReplSetConfig {
    /// Replica set identifier, used as the membership `_id`
    #[serde(default = "default_name")]
    pub name: String,

    /// Host every node binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of node 0; node `i` listens on `start_port + i`
    #[serde(default = "default_start_port")]
    pub start_port: u16,

    /// Number of data-bearing secondaries
    #[serde(default = "default_secondaries")]
    pub secondaries: usize,

    /// Number of arbiters
    #[serde(default)]
    pub arbiters: usize,

    /// Data store executable handed to node managers
    #[serde(default = "default_bin")]
    pub bin: String,

    /// Base data directory; each node uses `<db_path>/data-<port>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// Base log directory; each node logs to `<log_path>/data-<port>.log`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Wipe each node's data directory before the first start
    #[serde(default = "default_purge_on_start")]
    pub purge_on_start: bool,

    /// Extra flags forwarded verbatim to every node process
    #[serde(default)]
    pub server_options: BTreeMap<String, String>,
}

impl Default for ReplSetConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            host: default_host(),
            start_port: default_start_port(),
            secondaries: default_secondaries(),
            arbiters: 0,
            bin: default_bin(),
            db_path: None,
            log_path: None,
            purge_on_start: default_purge_on_start(),
            server_options: BTreeMap::new(),
        }
    }
}

impl ReplSetConfig {
    /// Primary + secondaries + arbiters
    pub fn total_nodes(&self) -> usize {
        self.secondaries + self.arbiters + 1
    }

    /// Server options with orchestrator-only keys removed
    pub fn node_server_options(&self) -> BTreeMap<String, String> {
        self.server_options
            .iter()
            .filter(|(k, _)| !ORCHESTRATOR_ONLY_OPTIONS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::InvalidSettings("replica set name cannot be empty".into()).into());
        }

        if self.host.trim().is_empty() {
            return Err(ConfigurationError::InvalidSettings("host cannot be empty".into()).into());
        }

        if self.start_port == 0 {
            return Err(ConfigurationError::InvalidSettings("start_port must be non-zero".into()).into());
        }

        let last_port = self.start_port as usize + self.total_nodes() - 1;
        if last_port > u16::MAX as usize {
            return Err(ConfigurationError::PortRange {
                start_port: self.start_port,
                count: self.total_nodes(),
            }
            .into());
        }

        if self.bin.trim().is_empty() {
            return Err(ConfigurationError::InvalidSettings("bin cannot be empty".into()).into());
        }

        Ok(())
    }
}

fn default_name() -> String {
    DEFAULT_REPL_SET_NAME.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_start_port() -> u16 {
    DEFAULT_START_PORT
}
fn default_secondaries() -> usize {
    DEFAULT_SECONDARIES
}
fn default_bin() -> String {
    DEFAULT_BIN.to_string()
}
fn default_purge_on_start() -> bool {
    true
}
