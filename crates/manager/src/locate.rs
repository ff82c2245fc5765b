// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolve a workspace identity to its single live compute unit.

use crate::error::ManagerError;
use std::time::Duration;
use wsman_core::{ComputeUnit, WorkspaceId};
use wsman_state::ClusterStateCache;

/// Find the live unit of a workspace, whatever its type.
///
/// Waits up to `timeout` for the cache's initial sync. Several live units
/// for one identity are never narrowed down to one.
pub async fn find_workspace_pod(
    cache: &ClusterStateCache,
    id: &WorkspaceId,
    timeout: Duration,
) -> Result<ComputeUnit, ManagerError> {
    cache.wait_for_sync(timeout).await?;
    select_unit(id, cache.get_pods(id))
}

/// Pick the single non-terminated unit out of `units`.
pub fn select_unit(
    id: &WorkspaceId,
    units: impl IntoIterator<Item = ComputeUnit>,
) -> Result<ComputeUnit, ManagerError> {
    let mut live: Vec<ComputeUnit> = units.into_iter().filter(|u| !u.is_terminated()).collect();
    match live.len() {
        0 => Err(ManagerError::workspace_not_found(id)),
        1 => Ok(live.remove(0)),
        count => {
            tracing::warn!(workspace_id = %id, count, "duplicate workspace identity");
            Err(ManagerError::DuplicateIdentity {
                id: id.clone(),
                count,
            })
        }
    }
}

#[cfg(test)]
#[path = "locate_tests.rs"]
mod tests;
