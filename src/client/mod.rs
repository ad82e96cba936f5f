//! Administrative client seam.
//!
//! The orchestrator never speaks the data store's wire protocol itself. It
//! talks to nodes through [`ClusterClient`] implementations handed in by the
//! caller, and only builds and decodes the command documents.

mod command;
mod status;

pub use command::*;
pub use status::*;

#[cfg(test)]
mod command_test;

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::NodeAddress;
use crate::Result;
use crate::TransportError;

/// Command and reply documents. Key order is preserved, so the command name
/// stays the first key.
pub type Document = serde_json::Value;

/// Outcome of a connect attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Connected,
    Error(String),
    Closed,
    TimedOut,
}

impl ClientEvent {
    /// Anything but `Connected` becomes a [`TransportError`].
    pub fn into_result(
        self,
        address: &NodeAddress,
        timeout: Duration,
    ) -> Result<()> {
        match self {
            ClientEvent::Connected => Ok(()),
            ClientEvent::Error(reason) => Err(TransportError::ConnectFailed {
                address: address.name(),
                reason,
            }
            .into()),
            ClientEvent::Closed => Err(TransportError::Closed {
                address: address.name(),
            }
            .into()),
            ClientEvent::TimedOut => Err(TransportError::TimedOut {
                address: address.name(),
                timeout,
            }
            .into()),
        }
    }
}

/// Per-command options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    pub read_preference: Option<String>,
}

/// Connection parameters for a new client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub connect_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(2000),
        }
    }
}

/// Connection to a single node able to run administrative commands.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterClient: Send {
    /// Opens the connection and reports how it went
    async fn connect(&mut self) -> ClientEvent;

    /// Sends `document` against `namespace`. `Ok` means the round-trip
    /// completed; the reply may still carry `ok: 0`.
    async fn command(
        &mut self,
        namespace: &str,
        document: Document,
        options: CommandOptions,
    ) -> Result<Document>;

    /// Releases the connection
    async fn close(&mut self);
}

/// Opens clients against node addresses.
pub trait ClusterClientFactory: Send + Sync {
    fn create(
        &self,
        address: &NodeAddress,
        options: &ClientOptions,
    ) -> Box<dyn ClusterClient>;
}

impl<F> ClusterClientFactory for F
where
    F: Fn(&NodeAddress, &ClientOptions) -> Box<dyn ClusterClient> + Send + Sync,
{
    fn create(
        &self,
        address: &NodeAddress,
        options: &ClientOptions,
    ) -> Box<dyn ClusterClient> {
        self(address, options)
    }
}

/// Creates a client for `address` and drives it to `Connected`.
pub async fn open_client(
    factory: &dyn ClusterClientFactory,
    address: &NodeAddress,
    options: &ClientOptions,
) -> Result<Box<dyn ClusterClient>> {
    let mut client = factory.create(address, options);
    match client.connect().await.into_result(address, options.connect_timeout) {
        Ok(()) => Ok(client),
        Err(e) => {
            client.close().await;
            Err(e)
        }
    }
}
