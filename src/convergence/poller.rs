use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;

use super::Backoff;
use crate::run_admin_command;
use crate::AdminCommand;
use crate::ClusterClient;
use crate::ClusterStatusSnapshot;
use crate::CommandOptions;
use crate::Error;
use crate::Result;

/// Outcome of a successful wait
#[derive(Debug, Clone)]
pub struct ConvergenceReport {
    /// Number of status queries issued, the successful one included
    pub attempts: u64,
    /// The status that satisfied the health predicate
    pub snapshot: ClusterStatusSnapshot,
}

pub struct ConvergencePoller {
    backoff: Arc<dyn Backoff>,
    accepted_states: Vec<i32>,
    cancel: Option<CancellationToken>,
}

impl std::fmt::Debug for ConvergencePoller {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ConvergencePoller")
            .field("accepted_states", &self.accepted_states)
            .finish()
    }
}

impl ConvergencePoller {
    pub fn new(
        backoff: Arc<dyn Backoff>,
        accepted_states: Vec<i32>,
    ) -> Self {
        Self {
            backoff,
            accepted_states,
            cancel: None,
        }
    }

    /// Lets the owner abort an otherwise unbounded wait.
    pub fn with_cancellation(
        mut self,
        token: CancellationToken,
    ) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Polls through `client` until the replica set converges.
    ///
    /// On success the client is closed before returning. On failure the
    /// caller still owns the client and is responsible for closing it.
    pub async fn wait(
        &self,
        client: &mut dyn ClusterClient,
    ) -> Result<ConvergenceReport> {
        let mut attempt: u64 = 0;
        loop {
            if let Some(token) = &self.cancel {
                if token.is_cancelled() {
                    return Err(Error::Cancelled { attempts: attempt });
                }
            }

            attempt += 1;
            info!(attempt, "waiting for replica set to converge");

            match self.poll_once(client).await {
                Ok(Some(snapshot)) => {
                    info!(attempts = attempt, "replica set is up");
                    client.close().await;
                    return Ok(ConvergenceReport {
                        attempts: attempt,
                        snapshot,
                    });
                }
                Ok(None) => {}
                Err(e) if e.is_retryable() => {
                    debug!(attempt, "status query not usable yet: {}", e);
                }
                Err(e) => {
                    error!(attempt, "convergence aborted: {}", e);
                    return Err(e);
                }
            }

            self.pause(attempt).await?;
        }
    }

    /// One status round-trip. `Ok(None)` means reachable but not converged.
    async fn poll_once(
        &self,
        client: &mut dyn ClusterClient,
    ) -> Result<Option<ClusterStatusSnapshot>> {
        let reply = run_admin_command(client, &AdminCommand::ReplSetGetStatus, CommandOptions::default()).await?;
        let snapshot = ClusterStatusSnapshot::from_reply(&reply)?;

        if snapshot.all_in(&self.accepted_states) {
            return Ok(Some(snapshot));
        }

        for member in snapshot.lagging(&self.accepted_states) {
            debug!(member = %member.name, state = member.state, "member not ready");
        }
        Ok(None)
    }

    async fn pause(
        &self,
        attempt: u64,
    ) -> Result<()> {
        let delay = self.backoff.delay(attempt);
        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => Err(Error::Cancelled { attempts: attempt }),
                    _ = sleep(delay) => Ok(()),
                }
            }
            None => {
                sleep(delay).await;
                Ok(())
            }
        }
    }
}
