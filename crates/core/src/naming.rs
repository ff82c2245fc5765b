// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Label keys, annotation keys and object naming rules.
//!
//! These strings are the contract between the manager and the cluster: the
//! cache indexes objects by them and the port controller derives service
//! names from them, so they must never change for existing workspaces.

use crate::id::WorkspaceId;
use crate::workspace::{PortVisibility, WorkspaceType};

/// Label carrying the workspace identity on every workspace object.
pub const WORKSPACE_ID_LABEL: &str = "workspaceID";
/// Label carrying the [`WorkspaceType`] of a compute unit.
pub const WORKSPACE_TYPE_LABEL: &str = "workspaceType";
pub const META_ID_LABEL: &str = "metaID";
pub const OWNER_LABEL: &str = "owner";
/// Marks objects created and owned by the workspace manager.
pub const MANAGED_LABEL: &str = "wsman.io/managed";

/// Annotation holding the service-name prefix unique to a compute unit.
pub const SERVICE_PREFIX_ANNOTATION: &str = "wsman.io/servicePrefix";
/// Annotation on a ports service holding `{port: ingressPort}` as JSON.
pub const INGRESS_PORTS_ANNOTATION: &str = "wsman.io/ingressPorts";

/// Lifecycle record data keys.
pub const STOPPING_SINCE_KEY: &str = "stoppingSince";
pub const FINAL_BACKUP_COMPLETE_KEY: &str = "finalBackupComplete";

/// Name of the compute unit for a workspace, e.g. `ws-foobar` or `prebuild-foobar`.
pub fn unit_name(ty: WorkspaceType, id: &WorkspaceId) -> String {
    format!("{}-{}", ty.unit_prefix(), id)
}

/// Name of the ports service derived from a unit's service prefix.
pub fn ports_service_name(service_prefix: &str) -> String {
    format!("ws-{}-ports", service_prefix)
}

/// Name of the lifecycle record of a workspace.
pub fn lifecycle_record_name(id: &WorkspaceId) -> String {
    format!("ws-{}-lifecycle", id)
}

/// Encode port number and visibility into a service port name (`p8080-public`).
pub fn port_name(port: u32, visibility: PortVisibility) -> String {
    format!("p{}-{}", port, visibility)
}

/// Parse a service port name produced by [`port_name`].
pub fn parse_port_name(name: &str) -> Option<(u32, PortVisibility)> {
    let rest = name.strip_prefix('p')?;
    let (port, visibility) = rest.split_once('-')?;
    Some((port.parse().ok()?, visibility.parse().ok()?))
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;
