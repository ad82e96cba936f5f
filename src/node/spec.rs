//! Per-node configuration derived from the replica set settings.
//!
//! Node `i` listens on `start_port + i`. Node 0 is the primary candidate,
//! followed by the secondaries and finally the arbiters.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use crate::constants::DATA_DIR_PREFIX;
use crate::constants::LOG_FILE_SUFFIX;
use crate::ConfigurationError;
use crate::ReplSetConfig;
use crate::Result;

/// Network address of one node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAddress {
    pub host: String,
    pub port: u16,
}

impl NodeAddress {
    pub fn new(
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port`, the form members are registered under
    pub fn name(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Whether a node is planned as a data-bearing voter or an arbiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Voting,
    Arbiter,
}

/// Immutable configuration of one provisioned node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub ordinal: usize,
    pub address: NodeAddress,
    pub db_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub kind: MemberKind,
    /// Replica set name the node is launched with
    pub repl_set: String,
    /// Data store executable
    pub bin: String,
    /// Flags forwarded to the node process
    pub server_options: BTreeMap<String, String>,
}

impl NodeSpec {
    pub fn name(&self) -> String {
        self.address.name()
    }

    pub fn is_arbiter(&self) -> bool {
        self.kind == MemberKind::Arbiter
    }
}

/// Splits the replica set settings into one [`NodeSpec`] per planned node.
pub fn plan_nodes(config: &ReplSetConfig) -> Result<Vec<NodeSpec>> {
    config.validate()?;

    let total = config.total_nodes();
    let server_options = config.node_server_options();

    let mut specs = Vec::with_capacity(total);
    for ordinal in 0..total {
        let port = u16::try_from(config.start_port as usize + ordinal).map_err(|_| ConfigurationError::PortRange {
            start_port: config.start_port,
            count: total,
        })?;

        let kind = if ordinal > config.secondaries {
            MemberKind::Arbiter
        } else {
            MemberKind::Voting
        };

        specs.push(NodeSpec {
            ordinal,
            address: NodeAddress::new(config.host.clone(), port),
            db_path: config.db_path.as_deref().map(|base| node_db_path(base, port)),
            log_path: config.log_path.as_deref().map(|base| node_log_path(base, port)),
            kind,
            repl_set: config.name.clone(),
            bin: config.bin.clone(),
            server_options: server_options.clone(),
        });
    }

    Ok(specs)
}

/// `<base>/data-<port>`
pub(crate) fn node_db_path(
    base: &Path,
    port: u16,
) -> PathBuf {
    base.join(format!("{}{}", DATA_DIR_PREFIX, port))
}

/// `<base>/data-<port>.log`
pub(crate) fn node_log_path(
    base: &Path,
    port: u16,
) -> PathBuf {
    base.join(format!("{}{}{}", DATA_DIR_PREFIX, port, LOG_FILE_SUFFIX))
}
