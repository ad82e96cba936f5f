use std::time::Instant;

use serde::Deserialize;

use super::Document;
use crate::constants::REPL_SET_GET_STATUS;
use crate::constants::STATE_ARBITER;
use crate::constants::STATE_PRIMARY;
use crate::constants::STATE_SECONDARY;
use crate::Error;
use crate::NodeRole;
use crate::Result;

/// One member entry of a `replSetGetStatus` reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStatus {
    #[serde(rename = "_id")]
    pub id: u32,
    pub name: String,
    /// Raw state code, opaque to the orchestrator beyond the accepted set
    pub state: i32,
    #[serde(default)]
    pub state_str: Option<String>,
    #[serde(default)]
    pub health: Option<f64>,
}

impl MemberStatus {
    pub fn role(&self) -> NodeRole {
        match self.state {
            STATE_PRIMARY => NodeRole::Primary,
            STATE_SECONDARY => NodeRole::Secondary,
            STATE_ARBITER => NodeRole::Arbiter,
            _ => NodeRole::Unknown,
        }
    }
}

/// Decoded `replSetGetStatus` reply, stamped with the time it was received.
#[derive(Debug, Clone)]
pub struct ClusterStatusSnapshot {
    pub set: Option<String>,
    pub members: Vec<MemberStatus>,
    pub observed_at: Instant,
}

#[derive(Deserialize)]
struct RawStatus {
    #[serde(default)]
    set: Option<String>,
    #[serde(default)]
    members: Vec<MemberStatus>,
}

impl ClusterStatusSnapshot {
    pub fn from_reply(reply: &Document) -> Result<Self> {
        let raw = RawStatus::deserialize(reply).map_err(|e| Error::MalformedReply {
            command: REPL_SET_GET_STATUS,
            reason: e.to_string(),
        })?;
        Ok(Self {
            set: raw.set,
            members: raw.members,
            observed_at: Instant::now(),
        })
    }

    /// Every member reports a state in `accepted`. An empty member list has
    /// not converged.
    pub fn all_in(
        &self,
        accepted: &[i32],
    ) -> bool {
        !self.members.is_empty() && self.members.iter().all(|m| accepted.contains(&m.state))
    }

    /// Members whose state is outside `accepted`
    pub fn lagging<'a>(
        &'a self,
        accepted: &'a [i32],
    ) -> impl Iterator<Item = &'a MemberStatus> + 'a {
        self.members.iter().filter(move |m| !accepted.contains(&m.state))
    }

    /// Name of the member reporting PRIMARY, if any
    pub fn primary(&self) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.state == STATE_PRIMARY)
            .map(|m| m.name.as_str())
    }
}
