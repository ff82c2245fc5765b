// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace types, port specs and the derived workspace status.
//!
//! [`WorkspaceStatus`] is never stored: it is projected on demand from the
//! compute unit, ports service and lifecycle record of one workspace.

use crate::id::{MetaId, OwnerId, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of workspace; determines the unit naming prefix and lifecycle policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceType {
    #[default]
    Regular,
    Prebuild,
    Probe,
    Ghost,
}

impl WorkspaceType {
    pub const ALL: [WorkspaceType; 4] = [
        WorkspaceType::Regular,
        WorkspaceType::Prebuild,
        WorkspaceType::Probe,
        WorkspaceType::Ghost,
    ];

    /// Prefix of the compute unit name for this type (`ws`, `prebuild`, ...).
    pub fn unit_prefix(self) -> &'static str {
        match self {
            WorkspaceType::Regular => "ws",
            WorkspaceType::Prebuild => "prebuild",
            WorkspaceType::Probe => "probe",
            WorkspaceType::Ghost => "ghost",
        }
    }

    /// Label value stored on the compute unit.
    pub fn as_label(self) -> &'static str {
        match self {
            WorkspaceType::Regular => "regular",
            WorkspaceType::Prebuild => "prebuild",
            WorkspaceType::Probe => "probe",
            WorkspaceType::Ghost => "ghost",
        }
    }
}

impl fmt::Display for WorkspaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl FromStr for WorkspaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkspaceType::ALL
            .into_iter()
            .find(|t| t.as_label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown workspace type: {}", s))
    }
}

/// Who can reach an exposed port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortVisibility {
    /// Reachable only from inside the cluster; never needs an ingress listener
    #[default]
    Private,
    /// Routed through an ingress listener assigned by the port allocator
    Public,
}

impl PortVisibility {
    pub fn as_str(self) -> &'static str {
        match self {
            PortVisibility::Private => "private",
            PortVisibility::Public => "public",
        }
    }

    pub fn is_public(self) -> bool {
        self == PortVisibility::Public
    }
}

impl fmt::Display for PortVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(PortVisibility::Private),
            "public" => Ok(PortVisibility::Public),
            other => Err(format!("unknown port visibility: {}", other)),
        }
    }
}

/// A single exposed port of a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortSpec {
    /// Port number on the ports service
    pub port: u32,
    /// Port inside the workspace the service forwards to
    pub target: u32,
    #[serde(default)]
    pub visibility: PortVisibility,
    /// Externally reachable URL; only set for public ports with an ingress
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PortSpec {
    pub fn new(port: u32, target: u32, visibility: PortVisibility) -> Self {
        Self {
            port,
            target,
            visibility,
            url: None,
        }
    }

    /// Same exposure, ignoring the derived URL.
    pub fn is_equivalent(&self, other: &PortSpec) -> bool {
        self.port == other.port
            && self.target == other.target
            && self.visibility == other.visibility
    }
}

/// Sort a port set into its canonical (port number) order.
pub fn sort_ports(ports: &mut [PortSpec]) {
    ports.sort_by(|a, b| a.port.cmp(&b.port).then(a.target.cmp(&b.target)));
}

/// Lifecycle phase reported for a workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspacePhase {
    #[default]
    Unknown,
    Pending,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for WorkspacePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkspacePhase::Unknown => "unknown",
            WorkspacePhase::Pending => "pending",
            WorkspacePhase::Running => "running",
            WorkspacePhase::Stopping => "stopping",
            WorkspacePhase::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceMetadata {
    pub owner: OwnerId,
    pub meta_id: MetaId,
    /// Creation time of the compute unit, epoch milliseconds
    pub started_at_ms: u64,
}

/// Lifecycle facts that are not expressible on the compute unit itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConditions {
    #[serde(default)]
    pub final_backup_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopping_since_ms: Option<u64>,
}

/// Projection of all cluster objects of one workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceStatus {
    pub id: WorkspaceId,
    pub metadata: WorkspaceMetadata,
    pub workspace_type: WorkspaceType,
    /// Name of the compute unit backing the workspace
    pub unit_name: String,
    pub phase: WorkspacePhase,
    /// Exposed ports, sorted by port number
    #[serde(default)]
    pub exposed_ports: Vec<PortSpec>,
    #[serde(default)]
    pub conditions: WorkspaceConditions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
