// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request and response types of the manager API.

use crate::id::{MetaId, OwnerId, WorkspaceId};
use crate::workspace::{PortSpec, WorkspaceStatus, WorkspaceType};
use serde::{Deserialize, Serialize};

/// Owner-facing metadata supplied with a start request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartMetadata {
    #[serde(default)]
    pub owner: OwnerId,
    #[serde(default)]
    pub meta_id: MetaId,
}

/// How the workspace content gets initialized; opaque to the manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Initializer {
    Empty,
    Git { remote_uri: String, checkout: String },
    Snapshot { location: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartWorkspaceSpec {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub workspace_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<Initializer>,
    /// Ports exposed from the start
    #[serde(default)]
    pub ports: Vec<PortSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartWorkspaceRequest {
    #[serde(default)]
    pub id: WorkspaceId,
    /// Prefix for all services of the workspace; unique per compute unit
    #[serde(default)]
    pub service_prefix: String,
    #[serde(default)]
    pub metadata: StartMetadata,
    #[serde(default)]
    pub spec: StartWorkspaceSpec,
    #[serde(default, rename = "type")]
    pub workspace_type: WorkspaceType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartWorkspaceResponse {
    pub unit_name: String,
}

/// Optional metadata constraints for listing workspaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetWorkspacesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_id: Option<MetaId>,
}

impl GetWorkspacesRequest {
    pub fn matches(&self, status: &WorkspaceStatus) -> bool {
        self.owner
            .as_ref()
            .is_none_or(|o| *o == status.metadata.owner)
            && self
                .meta_id
                .as_ref()
                .is_none_or(|m| *m == status.metadata.meta_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPortRequest {
    pub id: WorkspaceId,
    /// `true` exposes the port, `false` removes it
    pub expose: bool,
    pub spec: PortSpec,
}

/// Result of a port mutation, valid regardless of the cache's catch-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPortResponse {
    pub port: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
