// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster objects mirrored by the state cache.
//!
//! The manager only ever looks at three kinds of objects: compute units
//! (the scheduled workload), ports services (network exposure) and
//! lifecycle records (state that outlives the unit). They form a closed set,
//! so they are modelled as [`ClusterObject`] rather than an open type switch.

use crate::id::{MetaId, OwnerId, WorkspaceId};
use crate::naming::{
    FINAL_BACKUP_COMPLETE_KEY, INGRESS_PORTS_ANNOTATION, META_ID_LABEL, OWNER_LABEL,
    SERVICE_PREFIX_ANNOTATION, STOPPING_SINCE_KEY, WORKSPACE_ID_LABEL, WORKSPACE_TYPE_LABEL,
};
use crate::workspace::WorkspaceType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of cluster object tracked by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Pod,
    Service,
    LifecycleRecord,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 3] = [
        ObjectKind::Pod,
        ObjectKind::Service,
        ObjectKind::LifecycleRecord,
    ];
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::Pod => "pod",
            ObjectKind::Service => "service",
            ObjectKind::LifecycleRecord => "lifecycle_record",
        };
        f.write_str(s)
    }
}

/// Metadata common to all cluster objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Assigned by the cluster on every write; strictly increasing
    #[serde(default)]
    pub resource_version: u64,
    #[serde(default)]
    pub created_at_ms: u64,
}

impl ObjectMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// Workspace identity from the `workspaceID` label, if set and non-empty.
    pub fn workspace_id(&self) -> Option<WorkspaceId> {
        self.label(WORKSPACE_ID_LABEL)
            .filter(|s| !s.is_empty())
            .map(WorkspaceId::new)
    }
}

/// Scheduling phase of a compute unit as reported by the cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum UnitPhase {
    #[default]
    Pending,
    Running,
    Terminating,
    Stopped,
    Unknown,
}

/// The scheduled workload instance of a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeUnit {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub phase: UnitPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
}

impl ComputeUnit {
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn workspace_id(&self) -> Option<WorkspaceId> {
        self.meta.workspace_id()
    }

    pub fn workspace_type(&self) -> Option<WorkspaceType> {
        self.meta.label(WORKSPACE_TYPE_LABEL)?.parse().ok()
    }

    pub fn service_prefix(&self) -> Option<&str> {
        self.meta
            .annotation(SERVICE_PREFIX_ANNOTATION)
            .filter(|s| !s.is_empty())
    }

    pub fn owner(&self) -> OwnerId {
        OwnerId::new(self.meta.label(OWNER_LABEL).unwrap_or_default())
    }

    pub fn meta_id(&self) -> MetaId {
        MetaId::new(self.meta.label(META_ID_LABEL).unwrap_or_default())
    }

    /// Terminated units no longer count towards the one-unit-per-workspace rule.
    pub fn is_terminated(&self) -> bool {
        self.phase == UnitPhase::Stopped
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    #[default]
    Tcp,
}

/// One port entry of a ports service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServicePort {
    /// Encodes port and visibility, see [`crate::naming::port_name`]
    pub name: String,
    pub port: u32,
    pub target_port: u32,
    #[serde(default)]
    pub protocol: Protocol,
}

/// Network exposure object for one compute unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortsService {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub ports: Vec<ServicePort>,
    #[serde(default)]
    pub selector: BTreeMap<String, String>,
}

impl PortsService {
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn workspace_id(&self) -> Option<WorkspaceId> {
        self.meta.workspace_id()
    }

    /// Ingress listener assignments recorded on the service (`port -> ingress port`).
    ///
    /// A malformed annotation reads as no assignments.
    pub fn ingress_ports(&self) -> BTreeMap<u32, u32> {
        self.meta
            .annotation(INGRESS_PORTS_ANNOTATION)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    /// Replace the recorded ingress assignments; an empty map removes the annotation.
    pub fn set_ingress_ports(&mut self, ports: &BTreeMap<u32, u32>) {
        if ports.is_empty() {
            self.meta.annotations.remove(INGRESS_PORTS_ANNOTATION);
            return;
        }
        // BTreeMap<u32, u32> always serializes
        let raw = serde_json::to_string(ports).unwrap_or_default();
        self.meta
            .annotations
            .insert(INGRESS_PORTS_ANNOTATION.to_string(), raw);
    }

    pub fn find_port(&self, port: u32) -> Option<&ServicePort> {
        self.ports.iter().find(|p| p.port == port)
    }
}

/// Lifecycle state of a workspace kept outside the compute unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleRecord {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl LifecycleRecord {
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn workspace_id(&self) -> Option<WorkspaceId> {
        self.meta.workspace_id()
    }

    pub fn stopping_since_ms(&self) -> Option<u64> {
        self.data.get(STOPPING_SINCE_KEY)?.parse().ok()
    }

    pub fn final_backup_complete(&self) -> bool {
        self.data
            .get(FINAL_BACKUP_COMPLETE_KEY)
            .is_some_and(|v| v == "true")
    }
}

/// Any object the cache mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClusterObject {
    Pod(ComputeUnit),
    Service(PortsService),
    LifecycleRecord(LifecycleRecord),
}

impl ClusterObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ClusterObject::Pod(_) => ObjectKind::Pod,
            ClusterObject::Service(_) => ObjectKind::Service,
            ClusterObject::LifecycleRecord(_) => ObjectKind::LifecycleRecord,
        }
    }

    pub fn meta(&self) -> &ObjectMeta {
        match self {
            ClusterObject::Pod(o) => &o.meta,
            ClusterObject::Service(o) => &o.meta,
            ClusterObject::LifecycleRecord(o) => &o.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut ObjectMeta {
        match self {
            ClusterObject::Pod(o) => &mut o.meta,
            ClusterObject::Service(o) => &mut o.meta,
            ClusterObject::LifecycleRecord(o) => &mut o.meta,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    pub fn resource_version(&self) -> u64 {
        self.meta().resource_version
    }
}

impl From<ComputeUnit> for ClusterObject {
    fn from(o: ComputeUnit) -> Self {
        ClusterObject::Pod(o)
    }
}

impl From<PortsService> for ClusterObject {
    fn from(o: PortsService) -> Self {
        ClusterObject::Service(o)
    }
}

impl From<LifecycleRecord> for ClusterObject {
    fn from(o: LifecycleRecord) -> Self {
        ClusterObject::LifecycleRecord(o)
    }
}

/// A change observed on a watch stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "object", rename_all = "snake_case")]
pub enum WatchEvent {
    Added(ClusterObject),
    Modified(ClusterObject),
    Deleted(ClusterObject),
}

impl WatchEvent {
    pub fn object(&self) -> &ClusterObject {
        match self {
            WatchEvent::Added(o) | WatchEvent::Modified(o) | WatchEvent::Deleted(o) => o,
        }
    }
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod tests;
