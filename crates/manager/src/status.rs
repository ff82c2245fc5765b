// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace status derived from a cache snapshot.
//!
//! Everything here is a pure function of its inputs; the same snapshot
//! always yields the same statuses.

use crate::error::ManagerError;
use crate::template::{UrlTemplate, UrlVars};
use wsman_core::naming::{parse_port_name, ports_service_name};
use wsman_core::{
    sort_ports, ComputeUnit, GetWorkspacesRequest, LifecycleRecord, PortSpec, PortVisibility,
    PortsService, UnitPhase, WorkspaceConditions, WorkspaceId, WorkspaceMetadata, WorkspacePhase,
    WorkspaceStatus,
};
use wsman_state::CacheSnapshot;

/// Resolves the external URL of public ports.
///
/// Without a template (or without an allocator) no URLs are reported.
#[derive(Debug, Clone, Default)]
pub struct PortUrls {
    host: String,
    template: Option<UrlTemplate>,
}

impl PortUrls {
    pub fn new(host: impl Into<String>, template: Option<UrlTemplate>) -> Self {
        Self {
            host: host.into(),
            template,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.template.is_some()
    }

    pub fn url(
        &self,
        id: &WorkspaceId,
        prefix: &str,
        spec: &PortSpec,
        ingress_port: Option<u32>,
    ) -> Option<String> {
        if !spec.visibility.is_public() {
            return None;
        }
        let template = self.template.as_ref()?;
        let ingress_port = ingress_port?;
        Some(template.render(&UrlVars {
            host: &self.host,
            ingress_port,
            id,
            prefix,
            workspace_port: spec.port,
        }))
    }
}

/// Status of one workspace.
///
/// With several units for the identity the single live one is used, or the
/// most recently created unit once all of them are stopped. More than one
/// live unit is a duplicate identity.
pub fn compute_status(
    snapshot: &CacheSnapshot,
    id: &WorkspaceId,
    urls: &PortUrls,
) -> Result<WorkspaceStatus, ManagerError> {
    let units = snapshot.pods.for_workspace(id);
    let live: Vec<&ComputeUnit> = units.iter().copied().filter(|u| !u.is_terminated()).collect();
    let unit = match live.as_slice() {
        [unit] => *unit,
        [] => units
            .iter()
            .copied()
            .max_by_key(|u| u.meta.created_at_ms)
            .ok_or_else(|| ManagerError::workspace_not_found(id))?,
        many => {
            return Err(ManagerError::DuplicateIdentity {
                id: id.clone(),
                count: many.len(),
            })
        }
    };

    let service = unit
        .service_prefix()
        .and_then(|prefix| snapshot.services.get(&ports_service_name(prefix)));
    let record = snapshot.records.for_workspace(id).into_iter().next();
    Ok(project_status(unit, service, record, urls))
}

/// Statuses of all known workspaces matching the request's filter.
///
/// Workspaces whose status cannot be derived are logged and left out;
/// identities known only from a lifecycle record are skipped quietly.
pub fn get_workspaces(
    snapshot: &CacheSnapshot,
    request: &GetWorkspacesRequest,
    urls: &PortUrls,
) -> Vec<WorkspaceStatus> {
    snapshot
        .workspace_ids()
        .into_iter()
        .filter_map(|id| match compute_status(snapshot, &id, urls) {
            Ok(status) => Some(status),
            // A lifecycle record can outlive its unit
            Err(ManagerError::NotFound(_)) => {
                tracing::debug!(workspace_id = %id, "no compute unit, skipping workspace");
                None
            }
            Err(e) => {
                tracing::warn!(workspace_id = %id, error = %e, "skipping workspace");
                None
            }
        })
        .filter(|status| request.matches(status))
        .collect()
}

/// Merge a unit with its ports service and lifecycle record.
pub fn project_status(
    unit: &ComputeUnit,
    service: Option<&PortsService>,
    record: Option<&LifecycleRecord>,
    urls: &PortUrls,
) -> WorkspaceStatus {
    let id = unit.workspace_id().unwrap_or_default();
    let prefix = unit.service_prefix().unwrap_or_default();

    WorkspaceStatus {
        exposed_ports: service
            .map(|s| exposed_ports(&id, prefix, s, urls))
            .unwrap_or_default(),
        metadata: WorkspaceMetadata {
            owner: unit.owner(),
            meta_id: unit.meta_id(),
            started_at_ms: unit.meta.created_at_ms,
        },
        workspace_type: unit.workspace_type().unwrap_or_default(),
        unit_name: unit.name().to_string(),
        phase: workspace_phase(unit.phase, record),
        conditions: WorkspaceConditions {
            final_backup_complete: record.is_some_and(|r| r.final_backup_complete()),
            stopping_since_ms: record.and_then(|r| r.stopping_since_ms()),
        },
        node_name: unit.node_name.clone(),
        id,
    }
}

pub fn workspace_phase(phase: UnitPhase, record: Option<&LifecycleRecord>) -> WorkspacePhase {
    let stopping = record.is_some_and(|r| r.stopping_since_ms().is_some());
    let backed_up = record.is_some_and(|r| r.final_backup_complete());
    match phase {
        UnitPhase::Pending => WorkspacePhase::Pending,
        UnitPhase::Running if stopping => WorkspacePhase::Stopping,
        UnitPhase::Running => WorkspacePhase::Running,
        UnitPhase::Terminating if backed_up => WorkspacePhase::Stopped,
        UnitPhase::Terminating => WorkspacePhase::Stopping,
        UnitPhase::Stopped => WorkspacePhase::Stopped,
        UnitPhase::Unknown => WorkspacePhase::Unknown,
    }
}

/// Port specs of a ports service, sorted by port.
pub fn exposed_ports(
    id: &WorkspaceId,
    prefix: &str,
    service: &PortsService,
    urls: &PortUrls,
) -> Vec<PortSpec> {
    let ingress = service.ingress_ports();
    let mut ports: Vec<PortSpec> = service
        .ports
        .iter()
        .map(|p| {
            let visibility = parse_port_name(&p.name)
                .map(|(_, v)| v)
                .unwrap_or(PortVisibility::Private);
            let mut spec = PortSpec::new(p.port, p.target_port, visibility);
            spec.url = urls.url(id, prefix, &spec, ingress.get(&p.port).copied());
            spec
        })
        .collect();
    sort_ports(&mut ports);
    ports
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
