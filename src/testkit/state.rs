use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde_json::json;

use super::RecordedCommand;
use crate::constants::STATE_ARBITER;
use crate::constants::STATE_PRIMARY;
use crate::constants::STATE_SECONDARY;
use crate::ClientEvent;
use crate::Document;
use crate::Error;
use crate::NodeRole;
use crate::NodeSpec;
use crate::NodeStartOptions;
use crate::NodeStatus;
use crate::Result;
use crate::TransportError;

const STATE_STARTUP2: i32 = 5;
const STATE_DOWN: i32 = 8;

#[derive(Debug, Default)]
pub(super) struct SimNode {
    pub arbiter: bool,
    pub connected: bool,
    /// Holds the initiated set configuration in its data directory
    pub member: bool,
    pub role: NodeRole,
    pub signals: Vec<i32>,
    pub starts: Vec<NodeStartOptions>,
}

#[derive(Debug, Default)]
pub(super) struct SimState {
    pub order: Vec<String>,
    pub nodes: BTreeMap<String, SimNode>,
    pub initiated: Option<Document>,
    pub pending_sync_polls: u32,
    pub start_failures: BTreeSet<String>,
    pub stop_failures: BTreeSet<String>,
    pub connect_events: BTreeMap<String, ClientEvent>,
    pub initiate_rejection: Option<Document>,
    pub step_down_rejection: Option<Document>,
    pub commands: Vec<RecordedCommand>,
    pub open_clients: usize,
}

impl SimState {
    pub fn register(
        &mut self,
        spec: &NodeSpec,
    ) {
        let name = spec.name();
        if !self.nodes.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.nodes.entry(name).or_default().arbiter = spec.is_arbiter();
    }

    pub fn node(
        &self,
        name: &str,
    ) -> Option<&SimNode> {
        self.nodes.get(name)
    }

    pub fn primary(&self) -> Option<String> {
        self.nodes
            .iter()
            .find(|(_, n)| n.connected && n.role == NodeRole::Primary)
            .map(|(name, _)| name.clone())
    }

    fn known(
        &mut self,
        name: &str,
    ) -> Result<&mut SimNode> {
        self.nodes.get_mut(name).ok_or_else(|| Error::ProcessStart {
            node: name.to_string(),
            reason: "node was never provisioned".to_string(),
        })
    }

    pub fn start_node(
        &mut self,
        name: &str,
        options: NodeStartOptions,
    ) -> Result<()> {
        if self.start_failures.contains(name) {
            return Err(Error::ProcessStart {
                node: name.to_string(),
                reason: "simulated start failure".to_string(),
            });
        }

        if options.purge {
            self.purge(name)?;
        }

        let (member, arbiter) = {
            let node = self.known(name)?;
            (node.member, node.arbiter)
        };
        let role = if self.initiated.is_none() || !member {
            NodeRole::Unknown
        } else if arbiter {
            NodeRole::Arbiter
        } else if self.primary().is_none() {
            NodeRole::Primary
        } else {
            NodeRole::Secondary
        };

        let node = self.known(name)?;
        node.connected = true;
        node.role = role;
        node.starts.push(options);
        Ok(())
    }

    /// Wipes the stored set configuration of `name`. The set is forgotten
    /// once no node holds it any more.
    fn purge(
        &mut self,
        name: &str,
    ) -> Result<()> {
        let node = self.known(name)?;
        node.member = false;
        node.role = NodeRole::Unknown;
        if self.initiated.is_some() && self.nodes.values().all(|n| !n.member) {
            self.initiated = None;
        }
        Ok(())
    }

    pub fn stop_node(
        &mut self,
        name: &str,
        signal: i32,
    ) -> Result<()> {
        if self.stop_failures.contains(name) {
            return Err(Error::ProcessStop {
                node: name.to_string(),
                reason: "simulated stop failure".to_string(),
            });
        }
        self.known(name)?.signals.push(signal);
        self.take_down(name);
        Ok(())
    }

    /// Disconnects `name`. A downed primary is replaced by the first
    /// connected secondary.
    pub fn take_down(
        &mut self,
        name: &str,
    ) {
        let Some(node) = self.nodes.get_mut(name) else {
            return;
        };
        node.connected = false;
        if node.role == NodeRole::Primary {
            node.role = NodeRole::Secondary;
            self.elect(Some(name));
        }
    }

    fn elect(
        &mut self,
        excluding: Option<&str>,
    ) -> Option<String> {
        let candidate = self
            .order
            .iter()
            .find(|name| {
                Some(name.as_str()) != excluding
                    && self
                        .nodes
                        .get(name.as_str())
                        .map(|n| n.connected && !n.arbiter)
                        .unwrap_or(false)
            })
            .cloned()?;
        if let Some(node) = self.nodes.get_mut(&candidate) {
            node.role = NodeRole::Primary;
        }
        Some(candidate)
    }

    pub fn is_master(
        &self,
        name: &str,
    ) -> Result<NodeStatus> {
        match self.nodes.get(name) {
            Some(node) if node.connected => Ok(NodeStatus {
                role: node.role,
                me: Some(name.to_string()),
                primary: self.primary(),
            }),
            _ => Err(TransportError::Closed {
                address: name.to_string(),
            }
            .into()),
        }
    }

    /// Handles one administrative command arriving at `address`
    pub fn dispatch(
        &mut self,
        address: &str,
        document: &Document,
    ) -> Document {
        let Some((name, value)) = document.as_object().and_then(|o| o.iter().next()) else {
            return json!({ "ok": 0, "errmsg": "empty command", "code": 59 });
        };

        match name.as_str() {
            "replSetInitiate" => self.initiate(value.clone()),
            "replSetGetStatus" => self.status(),
            "replSetStepDown" => {
                let force = document.get("force").and_then(|f| f.as_bool()).unwrap_or(false);
                self.step_down(address, force)
            }
            other => json!({ "ok": 0, "errmsg": format!("no such command: '{}'", other), "code": 59 }),
        }
    }

    fn initiate(
        &mut self,
        membership: Document,
    ) -> Document {
        if let Some(reply) = &self.initiate_rejection {
            return reply.clone();
        }
        if self.initiated.is_some() {
            return json!({ "ok": 0, "errmsg": "already initialized", "code": 23 });
        }
        self.initiated = Some(membership);

        for node in self.nodes.values_mut() {
            node.member = true;
        }
        for node in self.nodes.values_mut().filter(|n| n.connected) {
            node.role = if node.arbiter {
                NodeRole::Arbiter
            } else {
                NodeRole::Secondary
            };
        }
        self.elect(None);
        json!({ "ok": 1 })
    }

    fn status(&mut self) -> Document {
        if self.initiated.is_none() {
            return json!({ "ok": 0, "errmsg": "no replset config has been received", "code": 94 });
        }

        let syncing = self.pending_sync_polls > 0;
        if syncing {
            self.pending_sync_polls -= 1;
        }

        let members: Vec<Document> = self
            .order
            .iter()
            .enumerate()
            .filter_map(|(id, name)| self.nodes.get(name).map(|node| (id, name, node)))
            .map(|(id, name, node)| {
                let state = match (node.connected, node.role) {
                    (false, _) => STATE_DOWN,
                    (true, NodeRole::Primary) => STATE_PRIMARY,
                    (true, _) if syncing => STATE_STARTUP2,
                    (true, NodeRole::Secondary) => STATE_SECONDARY,
                    (true, NodeRole::Arbiter) => STATE_ARBITER,
                    (true, NodeRole::Unknown) => STATE_STARTUP2,
                };
                let health = u8::from(node.connected);
                json!({ "_id": id, "name": name, "state": state, "health": health })
            })
            .collect();

        json!({ "ok": 1, "set": self.set_name(), "members": members })
    }

    fn set_name(&self) -> String {
        self.initiated
            .as_ref()
            .and_then(|doc| doc.get("_id"))
            .and_then(|id| id.as_str())
            .unwrap_or_default()
            .to_string()
    }

    fn step_down(
        &mut self,
        address: &str,
        force: bool,
    ) -> Document {
        if let Some(reply) = &self.step_down_rejection {
            return reply.clone();
        }
        if self.primary().as_deref() != Some(address) {
            return json!({ "ok": 0, "errmsg": "not primary so can't step down", "code": 10107 });
        }

        let electable = self
            .nodes
            .iter()
            .any(|(name, n)| name != address && n.connected && !n.arbiter);
        if !electable && !force {
            return json!({
                "ok": 0,
                "errmsg": "No electable secondaries caught up as of now",
                "code": 262,
                "codeName": "ExceededTimeLimit",
            });
        }

        if let Some(node) = self.nodes.get_mut(address) {
            node.role = NodeRole::Secondary;
        }
        self.elect(Some(address));
        json!({ "ok": 1 })
    }
}
