// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Port controller: exposes and unexposes workspace ports.
//!
//! The ports service is read from the cluster, not the cache, so a call
//! always builds on the latest write (including its own retries). Writes
//! carry the resource version they were based on; conflicting writes are
//! re-planned from a fresh read.
//!
//! Calls for the same workspace are serialized.
//!
//! Listener bookkeeping: a listener allocated by a call that fails is
//! released again, unless the ports service records it (a write that landed
//! although its response was lost). A listener whose port becomes private or
//! is unexposed is released after the write succeeds.

use crate::deadline::{remaining, within};
use crate::error::ManagerError;
use crate::locate::find_workspace_pod;
use crate::locks::WorkspaceLocks;
use crate::notify::StatusBroadcaster;
use crate::status::{exposed_ports, project_status, PortUrls};
use crate::validate::validate_port;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;
use wsman_adapters::{ClusterClient, ClusterError, IngressPortAllocator};
use wsman_core::naming::{port_name, ports_service_name, MANAGED_LABEL, WORKSPACE_ID_LABEL};
use wsman_core::{
    ClusterObject, ComputeUnit, ControlPortRequest, ControlPortResponse, ObjectKind, ObjectMeta,
    PortSpec, PortsService, Protocol, ServicePort, WorkspaceId,
};
use wsman_state::ClusterStateCache;

/// Attempts at writing the ports service before giving up on conflicts
const MAX_WRITE_ATTEMPTS: usize = 5;

/// Bound on releasing a listener after a failed call
const COMPENSATION_TIMEOUT: Duration = Duration::from_secs(5);

pub struct PortController<'a, C, A> {
    pub cluster: &'a C,
    pub allocator: &'a A,
    pub cache: &'a ClusterStateCache,
    pub urls: &'a PortUrls,
    pub notifier: &'a StatusBroadcaster,
    pub locks: &'a WorkspaceLocks,
}

/// The workspace a request operates on.
struct Target<'u> {
    unit: &'u ComputeUnit,
    id: &'u WorkspaceId,
    prefix: &'u str,
    service_name: String,
}

enum Write {
    Create(PortsService),
    Update(PortsService),
    Delete(String),
}

impl<C: ClusterClient, A: IngressPortAllocator> PortController<'_, C, A> {
    pub async fn control_port(
        &self,
        req: &ControlPortRequest,
        deadline: Instant,
    ) -> Result<ControlPortResponse, ManagerError> {
        validate_port(&req.spec)?;
        let _guard = within(
            deadline,
            "waiting for other port changes",
            self.locks.lock(&req.id),
        )
        .await?;
        let unit = find_workspace_pod(self.cache, &req.id, remaining(deadline)).await?;
        let prefix = unit.service_prefix().ok_or_else(|| {
            ManagerError::Validation(format!("workspace {} has no service prefix", req.id))
        })?;
        let target = Target {
            unit: &unit,
            id: &req.id,
            prefix,
            service_name: ports_service_name(prefix),
        };

        if !req.expose {
            return self.unexpose(&target, &req.spec, deadline).await;
        }
        if req.spec.visibility.is_public() && !self.allocator.is_enabled() {
            return Err(ManagerError::Unsupported(format!(
                "exposing port {} publicly requires an ingress port allocator",
                req.spec.port
            )));
        }

        let mut allocated = None;
        let result = self.expose(&target, &req.spec, deadline, &mut allocated).await;
        if let (Err(e), Some(port)) = (&result, allocated) {
            self.compensate(&target, port, e).await;
        }
        result
    }

    async fn expose(
        &self,
        target: &Target<'_>,
        spec: &PortSpec,
        deadline: Instant,
        allocated: &mut Option<u32>,
    ) -> Result<ControlPortResponse, ManagerError> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let current = self.read_service(target, deadline).await?;

            if let Some(service) = &current {
                let existing = exposed_ports(target.id, target.prefix, service, &PortUrls::default());
                if existing.iter().any(|p| p.is_equivalent(spec)) {
                    tracing::debug!(workspace_id = %target.id, port = spec.port, "port already exposed");
                    return Ok(self.response(target, spec, &service.ingress_ports()));
                }
            }

            let mut ingress = current
                .as_ref()
                .map(PortsService::ingress_ports)
                .unwrap_or_default();
            let previous_listener = ingress.remove(&spec.port);
            let mut release_after = None;
            if spec.visibility.is_public() {
                let ingress_port = match previous_listener {
                    Some(ingress_port) => ingress_port,
                    None => self.allocate(target.id, spec.port, deadline, allocated).await?,
                };
                ingress.insert(spec.port, ingress_port);
            } else if previous_listener.is_some() {
                release_after = Some(spec.port);
            }

            let write = match &current {
                Some(service) => Write::Update(with_port(service.clone(), spec, &ingress)),
                None => Write::Create(with_port(self.new_service(target), spec, &ingress)),
            };
            if !self.commit(&write, deadline).await? {
                tracing::debug!(service = %target.service_name, attempt, "ports service changed, retrying");
                continue;
            }

            tracing::info!(
                workspace_id = %target.id,
                port = spec.port,
                target = spec.target,
                visibility = %spec.visibility,
                "port exposed"
            );
            // The listener now belongs to the written service
            allocated.take();
            if let Some(port) = release_after {
                self.release(target.id, port).await;
            }
            self.notify(target, write.service());
            return Ok(self.response(target, spec, &ingress));
        }
        Err(self.gave_up(target))
    }

    async fn unexpose(
        &self,
        target: &Target<'_>,
        spec: &PortSpec,
        deadline: Instant,
    ) -> Result<ControlPortResponse, ManagerError> {
        let unchanged = ControlPortResponse {
            port: spec.port,
            url: None,
        };
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let Some(current) = self.read_service(target, deadline).await? else {
                return Ok(unchanged);
            };
            if current.find_port(spec.port).is_none() {
                tracing::debug!(workspace_id = %target.id, port = spec.port, "port not exposed");
                return Ok(unchanged);
            }

            let mut service = current;
            service.ports.retain(|p| p.port != spec.port);
            let mut ingress = service.ingress_ports();
            let had_listener = ingress.remove(&spec.port).is_some();
            service.set_ingress_ports(&ingress);

            let write = if service.ports.is_empty() {
                Write::Delete(service.meta.name.clone())
            } else {
                Write::Update(service)
            };
            if !self.commit(&write, deadline).await? {
                tracing::debug!(service = %target.service_name, attempt, "ports service changed, retrying");
                continue;
            }

            tracing::info!(workspace_id = %target.id, port = spec.port, "port unexposed");
            if had_listener {
                self.release(target.id, spec.port).await;
            }
            self.notify(target, write.service());
            return Ok(unchanged);
        }
        Err(self.gave_up(target))
    }

    async fn read_service(
        &self,
        target: &Target<'_>,
        deadline: Instant,
    ) -> Result<Option<PortsService>, ManagerError> {
        let object = within(
            deadline,
            "reading ports service",
            self.cluster
                .get(self.cache.namespace(), ObjectKind::Service, &target.service_name),
        )
        .await??;
        Ok(match object {
            Some(ClusterObject::Service(service)) => Some(service),
            _ => None,
        })
    }

    /// Returns `false` when the write lost a race and has to be re-planned.
    async fn commit(&self, write: &Write, deadline: Instant) -> Result<bool, ManagerError> {
        let namespace = self.cache.namespace();
        let result = match write {
            Write::Create(service) => {
                let create = self.cluster.create(service.clone().into());
                within(deadline, "creating ports service", create).await?.map(drop)
            }
            Write::Update(service) => {
                let update = self.cluster.update(service.clone().into());
                within(deadline, "updating ports service", update).await?.map(drop)
            }
            Write::Delete(name) => {
                let delete = self.cluster.delete(namespace, ObjectKind::Service, name);
                within(deadline, "deleting ports service", delete).await?
            }
        };
        match result {
            Ok(()) => Ok(true),
            Err(
                ClusterError::Conflict { .. }
                | ClusterError::AlreadyExists { .. }
                | ClusterError::NotFound { .. },
            ) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn allocate(
        &self,
        id: &WorkspaceId,
        port: u32,
        deadline: Instant,
        allocated: &mut Option<u32>,
    ) -> Result<u32, ManagerError> {
        match within(deadline, "allocating ingress port", self.allocator.allocate(id, port)).await {
            Ok(result) => {
                let assignment = result?;
                *allocated = Some(port);
                Ok(assignment.ingress_port)
            }
            Err(e) => {
                // The allocator may have committed before the deadline hit
                *allocated = Some(port);
                Err(e)
            }
        }
    }

    /// Release the listener of a failed expose unless the ports service
    /// records it. When that cannot be confirmed the listener is kept.
    async fn compensate(&self, target: &Target<'_>, port: u32, error: &ManagerError) {
        let read = self.cluster.get(
            self.cache.namespace(),
            ObjectKind::Service,
            &target.service_name,
        );
        match tokio::time::timeout(COMPENSATION_TIMEOUT, read).await {
            Ok(Ok(Some(ClusterObject::Service(service))))
                if service.ingress_ports().contains_key(&port) =>
            {
                tracing::info!(
                    workspace_id = %target.id,
                    port,
                    error = %error,
                    "ports service records the listener, keeping it"
                );
                return;
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                tracing::warn!(
                    workspace_id = %target.id,
                    port,
                    error = %e,
                    "cannot confirm listener is unused, keeping it"
                );
                return;
            }
            Err(_) => {
                tracing::warn!(
                    workspace_id = %target.id,
                    port,
                    "timed out confirming listener is unused, keeping it"
                );
                return;
            }
        }
        tracing::info!(
            workspace_id = %target.id,
            port,
            error = %error,
            "releasing listener of failed expose"
        );
        self.release(target.id, port).await;
    }

    async fn release(&self, id: &WorkspaceId, port: u32) {
        match tokio::time::timeout(COMPENSATION_TIMEOUT, self.allocator.release(id, port)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(workspace_id = %id, port, error = %e, "failed to release ingress listener")
            }
            Err(_) => {
                tracing::warn!(workspace_id = %id, port, "timed out releasing ingress listener")
            }
        }
    }

    fn new_service(&self, target: &Target<'_>) -> PortsService {
        let mut meta = ObjectMeta::new(self.cache.namespace(), target.service_name.clone());
        meta.labels = BTreeMap::from([
            (WORKSPACE_ID_LABEL.to_string(), target.id.to_string()),
            (MANAGED_LABEL.to_string(), "true".to_string()),
        ]);
        PortsService {
            meta,
            ports: Vec::new(),
            selector: BTreeMap::from([(WORKSPACE_ID_LABEL.to_string(), target.id.to_string())]),
        }
    }

    fn response(
        &self,
        target: &Target<'_>,
        spec: &PortSpec,
        ingress: &BTreeMap<u32, u32>,
    ) -> ControlPortResponse {
        ControlPortResponse {
            port: spec.port,
            url: self
                .urls
                .url(target.id, target.prefix, spec, ingress.get(&spec.port).copied()),
        }
    }

    /// Publish the status the workspace has once the write is observed.
    fn notify(&self, target: &Target<'_>, service: Option<&PortsService>) {
        let record = self.cache.get_lifecycle_record(target.id);
        let status = project_status(target.unit, service, record.as_ref(), self.urls);
        self.notifier.publish(status);
    }

    fn gave_up(&self, target: &Target<'_>) -> ManagerError {
        ManagerError::Transient(format!(
            "{} kept changing, gave up after {} attempts",
            target.service_name, MAX_WRITE_ATTEMPTS
        ))
    }
}

impl Write {
    fn service(&self) -> Option<&PortsService> {
        match self {
            Write::Create(s) | Write::Update(s) => Some(s),
            Write::Delete(_) => None,
        }
    }
}

/// `service` with `spec` added (or replacing the same port number).
fn with_port(
    mut service: PortsService,
    spec: &PortSpec,
    ingress: &BTreeMap<u32, u32>,
) -> PortsService {
    service.ports.retain(|p| p.port != spec.port);
    service.ports.push(ServicePort {
        name: port_name(spec.port, spec.visibility),
        port: spec.port,
        target_port: spec.target,
        protocol: Protocol::Tcp,
    });
    service.ports.sort_by_key(|p| p.port);
    service.set_ingress_ports(ingress);
    service
}

#[cfg(test)]
#[path = "ports_tests.rs"]
mod tests;
