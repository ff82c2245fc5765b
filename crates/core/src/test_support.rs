// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::naming::{
    lifecycle_record_name, port_name, ports_service_name, unit_name, MANAGED_LABEL, META_ID_LABEL,
    OWNER_LABEL, SERVICE_PREFIX_ANNOTATION, WORKSPACE_ID_LABEL, WORKSPACE_TYPE_LABEL,
};
use crate::{
    ComputeUnit, LifecycleRecord, ObjectMeta, PortSpec, PortVisibility, PortsService, Protocol,
    ServicePort, UnitPhase, WorkspaceId, WorkspaceType,
};
use std::collections::BTreeMap;

pub const TEST_NAMESPACE: &str = "default";

// ── Object factory functions ────────────────────────────────────────────────

/// A running compute unit labelled the way the start-context builder labels it.
///
/// The service prefix is `<id>-prefix` so tests can derive the ports service name.
pub fn unit(id: &str, ty: WorkspaceType) -> ComputeUnit {
    let wsid = WorkspaceId::new(id);
    let mut meta = ObjectMeta::new(TEST_NAMESPACE, unit_name(ty, &wsid));
    meta.labels = BTreeMap::from([
        (WORKSPACE_ID_LABEL.to_string(), id.to_string()),
        (WORKSPACE_TYPE_LABEL.to_string(), ty.as_label().to_string()),
        (OWNER_LABEL.to_string(), "tester".to_string()),
        (META_ID_LABEL.to_string(), format!("meta-{}", id)),
        (MANAGED_LABEL.to_string(), "true".to_string()),
    ]);
    meta.annotations = BTreeMap::from([(
        SERVICE_PREFIX_ANNOTATION.to_string(),
        service_prefix(id),
    )]);
    meta.created_at_ms = 1_000_000;
    ComputeUnit {
        meta,
        phase: UnitPhase::Running,
        node_name: Some("node-1".to_string()),
    }
}

pub fn unit_in_phase(id: &str, ty: WorkspaceType, phase: UnitPhase) -> ComputeUnit {
    ComputeUnit {
        phase,
        ..unit(id, ty)
    }
}

pub fn service_prefix(id: &str) -> String {
    format!("{}-prefix", id)
}

/// Ports service of the workspace `id` exposing the given ports.
pub fn ports_service(id: &str, ports: &[PortSpec]) -> PortsService {
    let mut meta = ObjectMeta::new(TEST_NAMESPACE, ports_service_name(&service_prefix(id)));
    meta.labels = BTreeMap::from([
        (WORKSPACE_ID_LABEL.to_string(), id.to_string()),
        (MANAGED_LABEL.to_string(), "true".to_string()),
    ]);
    PortsService {
        meta,
        ports: ports.iter().map(service_port).collect(),
        selector: BTreeMap::from([(WORKSPACE_ID_LABEL.to_string(), id.to_string())]),
    }
}

pub fn service_port(spec: &PortSpec) -> ServicePort {
    ServicePort {
        name: port_name(spec.port, spec.visibility),
        port: spec.port,
        target_port: spec.target,
        protocol: Protocol::Tcp,
    }
}

pub fn lifecycle_record(id: &str, data: &[(&str, &str)]) -> LifecycleRecord {
    let wsid = WorkspaceId::new(id);
    let mut meta = ObjectMeta::new(TEST_NAMESPACE, lifecycle_record_name(&wsid));
    meta.labels = BTreeMap::from([(WORKSPACE_ID_LABEL.to_string(), id.to_string())]);
    LifecycleRecord {
        meta,
        data: data
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

pub fn public_port(port: u32) -> PortSpec {
    PortSpec::new(port, port, PortVisibility::Public)
}

pub fn private_port(port: u32) -> PortSpec {
    PortSpec::new(port, port, PortVisibility::Private)
}
