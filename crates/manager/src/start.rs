// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turning validated start requests into compute unit descriptors.

use crate::error::ManagerError;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use wsman_core::naming::{
    unit_name, MANAGED_LABEL, META_ID_LABEL, OWNER_LABEL, SERVICE_PREFIX_ANNOTATION,
    WORKSPACE_ID_LABEL, WORKSPACE_TYPE_LABEL,
};
use wsman_core::{ComputeUnit, ObjectMeta, StartWorkspaceRequest, UnitPhase};

/// Everything needed to create the compute unit of a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartContext {
    pub request: StartWorkspaceRequest,
    pub unit: ComputeUnit,
}

/// Builds the unit descriptor of a start request.
///
/// Only called with requests that passed validation.
pub trait StartContextBuilder: Send + Sync {
    fn build(
        &self,
        namespace: &str,
        request: &StartWorkspaceRequest,
    ) -> Result<StartContext, ManagerError>;
}

/// Minimal descriptor: name, identity labels and the service prefix
/// annotation. Scheduling details are left to the cluster.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitePodBuilder;

impl StartContextBuilder for DefinitePodBuilder {
    fn build(
        &self,
        namespace: &str,
        request: &StartWorkspaceRequest,
    ) -> Result<StartContext, ManagerError> {
        let ty = request.workspace_type;
        let mut meta = ObjectMeta::new(namespace, unit_name(ty, &request.id));
        meta.labels = BTreeMap::from([
            (WORKSPACE_ID_LABEL.to_string(), request.id.to_string()),
            (WORKSPACE_TYPE_LABEL.to_string(), ty.as_label().to_string()),
            (OWNER_LABEL.to_string(), request.metadata.owner.to_string()),
            (META_ID_LABEL.to_string(), request.metadata.meta_id.to_string()),
            (MANAGED_LABEL.to_string(), "true".to_string()),
        ]);
        if !request.service_prefix.is_empty() {
            meta.annotations.insert(
                SERVICE_PREFIX_ANNOTATION.to_string(),
                request.service_prefix.clone(),
            );
        }
        meta.created_at_ms = now_ms();

        Ok(StartContext {
            request: request.clone(),
            unit: ComputeUnit {
                meta,
                phase: UnitPhase::Pending,
                node_name: None,
            },
        })
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
