//! Replica Set Orchestration Error Hierarchy
//!
//! Errors are grouped by the stage that produced them: topology validation,
//! node process lifecycle, client transport, role selection and the
//! administrative commands rejected by the data store itself.

use std::time::Duration;

use config::ConfigError;

use crate::Document;
use crate::NodeRole;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration source could not be loaded or deserialized
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid topology request, detected before any process is started
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A node manager failed to bring its process up
    #[error("Node {node} failed to start: {reason}")]
    ProcessStart { node: String, reason: String },

    /// A node manager failed to bring its process down
    #[error("Node {node} failed to stop: {reason}")]
    ProcessStop { node: String, reason: String },

    /// Connection or round-trip failure between the orchestrator and a node
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No connected node currently reports the requested role
    #[error("No eligible {role} node found ({connected} connected)")]
    NoEligibleNode { role: NodeRole, connected: usize },

    /// Role lookup found zero connected nodes
    #[error("No servers available")]
    NoServersAvailable,

    /// The data store rejected an administrative command. `reply` is the
    /// untouched reply document.
    #[error("Command {command} rejected (code {code:?}): {message}")]
    AdminCommand {
        command: &'static str,
        code: Option<i64>,
        message: String,
        reply: Document,
    },

    /// A reply arrived but could not be decoded into the expected shape
    #[error("Malformed {command} reply: {reason}")]
    MalformedReply { command: &'static str, reason: String },

    /// The operation is not allowed in the current lifecycle state
    #[error("Operation {operation} not allowed while orchestrator is {state}")]
    InvalidState { operation: &'static str, state: String },

    /// A best-effort batch finished with one or more per-node failures
    #[error("{operation} finished with {} node failure(s)", failures.len())]
    PartialFailure {
        operation: &'static str,
        failures: Vec<Error>,
    },

    /// A convergence wait was cancelled by its owner
    #[error("Convergence wait cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// Membership cannot be assembled from zero nodes
    #[error("Node list is empty")]
    EmptyNodeList,

    /// Requested secondaries + arbiters exceed the non-primary slots
    #[error("Requested {requested} secondaries and arbiters but only {available} non-primary slot(s) exist")]
    TooManyMembers { requested: usize, available: usize },

    /// Port range overflows past the last valid port
    #[error("Port range starting at {start_port} cannot hold {count} node(s)")]
    PortRange { start_port: u16, count: usize },

    /// Generic settings violation
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connect attempt reported an error event
    #[error("Failed to connect to {address}: {reason}")]
    ConnectFailed { address: String, reason: String },

    /// Connection closed underneath the caller
    #[error("Connection to {address} closed")]
    Closed { address: String },

    /// Connect or command exceeded its timeout
    #[error("Connection to {address} timed out after {timeout:?}")]
    TimedOut { address: String, timeout: Duration },

    /// Command could not complete its round-trip
    #[error("Command {command} to {address} failed in transit: {reason}")]
    CommandFailed {
        command: String,
        address: String,
        reason: String,
    },
}

impl TransportError {
    /// A closed connection cannot carry further commands. Everything else
    /// may succeed on a later attempt over the same client.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TransportError::Closed { .. })
    }
}

impl Error {
    /// Errors the convergence poller treats as "not ready yet".
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_recoverable(),
            Error::AdminCommand { .. } | Error::MalformedReply { .. } => true,
            _ => false,
        }
    }

    /// Builds an [`Error::AdminCommand`] out of an `ok: 0` reply, keeping the
    /// reply as-is.
    pub(crate) fn admin_command(
        command: &'static str,
        reply: Document,
    ) -> Self {
        let code = reply.get("code").and_then(|c| c.as_i64());
        let message = reply
            .get("errmsg")
            .and_then(|m| m.as_str())
            .unwrap_or("command failed")
            .to_string();
        Error::AdminCommand {
            command,
            code,
            message,
            reply,
        }
    }
}
