//! Role-based node selection.
//!
//! Live roles are re-queried before every role-sensitive pick. Connected
//! nodes are refreshed concurrently, each through its own handle, so one
//! node never sees two status queries at once.

use futures::future::join_all;
use tracing::debug;

use crate::Error;
use crate::NodeHandle;
use crate::NodeRole;
use crate::NodeStatus;
use crate::Result;

/// Refreshes every connected node at once. Returns `(index, status)` for
/// the nodes that answered, in node order.
pub(crate) async fn refresh_connected(handles: &mut [NodeHandle]) -> Vec<(usize, NodeStatus)> {
    let refreshes = handles
        .iter_mut()
        .enumerate()
        .filter(|(_, handle)| handle.is_connected())
        .map(|(index, handle)| async move { (index, handle.refresh().await) });

    join_all(refreshes)
        .await
        .into_iter()
        .filter_map(|(index, result)| result.ok().map(|status| (index, status)))
        .collect()
}

fn connected_count(handles: &[NodeHandle]) -> usize {
    handles.iter().filter(|h| h.is_connected()).count()
}

/// First connected node, in node order, whose live role is `role`.
pub(crate) async fn select_connected_by_role(
    handles: &mut [NodeHandle],
    role: NodeRole,
) -> Result<usize> {
    if connected_count(handles) == 0 {
        return Err(Error::NoServersAvailable);
    }

    let answered = refresh_connected(handles).await;
    if let Some((index, _)) = answered.iter().find(|(_, status)| status.role == role) {
        debug!(node = %handles[*index].name(), %role, "selected connected node");
        return Ok(*index);
    }

    Err(Error::NoEligibleNode {
        role,
        connected: connected_count(handles),
    })
}

/// First disconnected node, in node order, whose last known role was `role`.
pub(crate) fn find_downed_by_role(
    handles: &[NodeHandle],
    role: NodeRole,
) -> Result<usize> {
    handles
        .iter()
        .position(|h| !h.is_connected() && h.last_known().role == role)
        .ok_or_else(|| Error::NoEligibleNode {
            role,
            connected: connected_count(handles),
        })
}

/// Locates the primary through the first connected node's view of the set.
///
/// Only that one node is asked. If it cannot answer, the error is returned
/// as-is and no other member is tried.
pub(crate) async fn locate_primary(handles: &mut [NodeHandle]) -> Result<usize> {
    let reporter = handles
        .iter()
        .position(|h| h.is_connected())
        .ok_or(Error::NoServersAvailable)?;

    let view = handles[reporter].refresh().await?;
    let not_found = || Error::NoEligibleNode {
        role: NodeRole::Primary,
        connected: connected_count(handles),
    };

    let primary = view.primary.ok_or_else(not_found)?;
    debug!(reporter = %handles[reporter].name(), %primary, "primary reported");

    handles
        .iter()
        .position(|h| h.is_connected() && h.answers_to(&primary))
        .ok_or_else(not_found)
}
