//! Membership document assembly.
//!
//! The document submitted with `replSetInitiate` is a pure function of the
//! planned nodes: member `_id`s follow list position, so node 0 is always
//! member 0 and ids are contiguous.

mod builder;
pub use builder::*;


use serde::Deserialize;
use serde::Serialize;

/// One member record of a replica set configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    #[serde(rename = "_id")]
    pub id: u32,
    pub host: String,
    #[serde(rename = "arbiterOnly", default, skip_serializing_if = "std::ops::Not::not")]
    pub arbiter_only: bool,
}

/// Replica set configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipDocument {
    /// Replica set name
    #[serde(rename = "_id")]
    pub id: String,
    pub version: u64,
    pub members: Vec<MemberRecord>,
}

impl MembershipDocument {
    pub fn member_ids(&self) -> Vec<u32> {
        self.members.iter().map(|m| m.id).collect()
    }

    pub fn voting_members(&self) -> usize {
        self.members.iter().filter(|m| !m.arbiter_only).count()
    }

    pub fn arbiters(&self) -> usize {
        self.members.iter().filter(|m| m.arbiter_only).count()
    }
}
