use tracing::trace;

use super::MemberRecord;
use super::MembershipDocument;
use crate::ConfigurationError;
use crate::NodeSpec;
use crate::ReplSetConfig;
use crate::Result;

/// Requested shape of the replica set. The primary slot is implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Topology {
    pub secondaries: usize,
    pub arbiters: usize,
}

impl Topology {
    pub fn new(
        secondaries: usize,
        arbiters: usize,
    ) -> Self {
        Self { secondaries, arbiters }
    }

    pub fn from_config(config: &ReplSetConfig) -> Self {
        Self::new(config.secondaries, config.arbiters)
    }

    /// Primary + secondaries + arbiters
    pub fn total(&self) -> usize {
        self.secondaries + self.arbiters + 1
    }
}

/// Derives the membership document for `specs`.
///
/// # Errors
/// `ConfigurationError::EmptyNodeList` when `specs` is empty and
/// `ConfigurationError::TooManyMembers` when secondaries plus arbiters do not
/// fit in the non-primary slots.
pub fn build_membership(
    repl_set: &str,
    version: u64,
    specs: &[NodeSpec],
    topology: Topology,
) -> Result<MembershipDocument> {
    if specs.is_empty() {
        return Err(ConfigurationError::EmptyNodeList.into());
    }

    let requested = topology.secondaries + topology.arbiters;
    let available = specs.len() - 1;
    if requested > available {
        return Err(ConfigurationError::TooManyMembers { requested, available }.into());
    }

    let members = specs
        .iter()
        .enumerate()
        .map(|(position, spec)| MemberRecord {
            id: position as u32,
            host: spec.name(),
            arbiter_only: spec.is_arbiter(),
        })
        .collect::<Vec<_>>();

    trace!(repl_set, version, members = members.len(), "membership assembled");

    Ok(MembershipDocument {
        id: repl_set.to_string(),
        version,
        members,
    })
}
