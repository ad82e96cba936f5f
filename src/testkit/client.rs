use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::state::SimState;
use super::RecordedCommand;
use crate::ClientEvent;
use crate::ClusterClient;
use crate::CommandOptions;
use crate::Document;
use crate::Result;
use crate::TransportError;

/// [`ClusterClient`] talking to a [`SimulatedReplicaSet`](super::SimulatedReplicaSet) node
pub struct SimulatedClient {
    state: Arc<Mutex<SimState>>,
    address: String,
    connected: bool,
}

impl SimulatedClient {
    pub(super) fn new(
        state: Arc<Mutex<SimState>>,
        address: String,
    ) -> Self {
        Self {
            state,
            address,
            connected: false,
        }
    }
}

#[async_trait]
impl ClusterClient for SimulatedClient {
    async fn connect(&mut self) -> ClientEvent {
        let mut state = self.state.lock();
        let reachable = state.node(&self.address).map(|n| n.connected).unwrap_or(false);
        let event = match state.connect_events.remove(&self.address) {
            Some(event) => event,
            None if reachable => ClientEvent::Connected,
            None => ClientEvent::Error("connection refused".to_string()),
        };
        if event == ClientEvent::Connected {
            self.connected = true;
            state.open_clients += 1;
        }
        event
    }

    async fn command(
        &mut self,
        namespace: &str,
        document: Document,
        options: CommandOptions,
    ) -> Result<Document> {
        if !self.connected {
            return Err(TransportError::Closed {
                address: self.address.clone(),
            }
            .into());
        }

        let mut state = self.state.lock();
        if !state.node(&self.address).map(|n| n.connected).unwrap_or(false) {
            return Err(TransportError::CommandFailed {
                command: document.as_object().and_then(|o| o.keys().next().cloned()).unwrap_or_default(),
                address: self.address.clone(),
                reason: "node unreachable".to_string(),
            }
            .into());
        }

        state.commands.push(RecordedCommand {
            address: self.address.clone(),
            namespace: namespace.to_string(),
            document: document.clone(),
            read_preference: options.read_preference,
        });
        Ok(state.dispatch(&self.address, &document))
    }

    async fn close(&mut self) {
        if self.connected {
            self.connected = false;
            self.state.lock().open_clients -= 1;
        }
    }
}
