use serde_json::json;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;

use super::ClusterClient;
use super::CommandOptions;
use super::Document;
use crate::constants::ADMIN_NAMESPACE;
use crate::constants::REPL_SET_GET_STATUS;
use crate::constants::REPL_SET_INITIATE;
use crate::constants::REPL_SET_STEP_DOWN;
use crate::ConfigurationError;
use crate::Error;
use crate::MembershipDocument;
use crate::Result;

/// Administrative commands the orchestrator issues
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    /// Establish the replica set with the given membership
    ReplSetInitiate(MembershipDocument),
    /// Ask one member for every member's state
    ReplSetGetStatus,
    /// Make the primary relinquish its role
    ReplSetStepDown { avoid_election_for_secs: u64, force: bool },
}

impl AdminCommand {
    pub fn name(&self) -> &'static str {
        match self {
            AdminCommand::ReplSetInitiate(_) => REPL_SET_INITIATE,
            AdminCommand::ReplSetGetStatus => REPL_SET_GET_STATUS,
            AdminCommand::ReplSetStepDown { .. } => REPL_SET_STEP_DOWN,
        }
    }

    /// Encodes the command; its name is always the first key.
    pub fn to_document(&self) -> Result<Document> {
        let mut doc = Map::new();
        match self {
            AdminCommand::ReplSetInitiate(membership) => {
                let payload = serde_json::to_value(membership).map_err(|e| {
                    ConfigurationError::InvalidSettings(format!("membership document does not encode: {}", e))
                })?;
                doc.insert(REPL_SET_INITIATE.to_string(), payload);
            }
            AdminCommand::ReplSetGetStatus => {
                doc.insert(REPL_SET_GET_STATUS.to_string(), json!(1));
            }
            AdminCommand::ReplSetStepDown {
                avoid_election_for_secs,
                force,
            } => {
                doc.insert(REPL_SET_STEP_DOWN.to_string(), json!(avoid_election_for_secs));
                doc.insert("force".to_string(), json!(force));
            }
        }
        Ok(Value::Object(doc))
    }
}

/// `ok: 1` (integer or double) or `ok: true` means the store accepted the
/// command.
pub fn reply_ok(reply: &Document) -> bool {
    match reply.get("ok") {
        Some(Value::Bool(ok)) => *ok,
        Some(ok) => ok.as_f64().map(|ok| ok == 1.0).unwrap_or(false),
        None => false,
    }
}

/// Runs `command` against the admin namespace. A reply with `ok: 0` becomes
/// [`Error::AdminCommand`] carrying the reply untouched.
pub async fn run_admin_command(
    client: &mut dyn ClusterClient,
    command: &AdminCommand,
    options: CommandOptions,
) -> Result<Document> {
    let document = command.to_document()?;
    debug!(command = command.name(), "issuing admin command");

    let reply = client.command(ADMIN_NAMESPACE, document, options).await?;
    if reply_ok(&reply) {
        Ok(reply)
    } else {
        Err(Error::admin_command(command.name(), reply))
    }
}
