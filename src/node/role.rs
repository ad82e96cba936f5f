use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Role a node reports for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Primary,
    Secondary,
    Arbiter,
    #[default]
    Unknown,
}

impl fmt::Display for NodeRole {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            NodeRole::Primary => write!(f, "primary"),
            NodeRole::Secondary => write!(f, "secondary"),
            NodeRole::Arbiter => write!(f, "arbiter"),
            NodeRole::Unknown => write!(f, "unknown"),
        }
    }
}

impl NodeRole {
    /// Maps an `isMaster`-style identity reply onto a role
    pub fn from_flags(
        is_master: bool,
        secondary: bool,
        arbiter_only: bool,
    ) -> Self {
        if is_master {
            NodeRole::Primary
        } else if secondary {
            NodeRole::Secondary
        } else if arbiter_only {
            NodeRole::Arbiter
        } else {
            NodeRole::Unknown
        }
    }
}

/// A node's view of itself and of the replica set, as last reported by its
/// manager.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStatus {
    /// Role the node reports for itself
    pub role: NodeRole,
    /// Self-reported address (`me`)
    pub me: Option<String>,
    /// Address of the primary as seen by this node
    pub primary: Option<String>,
}

impl NodeStatus {
    pub fn new(
        role: NodeRole,
        me: impl Into<String>,
        primary: Option<String>,
    ) -> Self {
        Self {
            role,
            me: Some(me.into()),
            primary,
        }
    }
}
