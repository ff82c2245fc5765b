// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural checks on start requests. Stops at the first violated rule.

use crate::error::ManagerError;
use std::collections::HashSet;
use wsman_core::{PortSpec, StartWorkspaceRequest, WorkspaceType};

const MAX_PORT: u32 = u16::MAX as u32;

pub fn validate_start_request(req: &StartWorkspaceRequest) -> Result<(), ManagerError> {
    require(!req.id.is_empty(), "missing workspace id")?;
    require(!req.metadata.owner.is_empty(), "missing owner")?;
    require(!req.metadata.meta_id.is_empty(), "missing metadata id")?;
    require(!req.spec.image.trim().is_empty(), "missing workspace image")?;
    require(
        !req.spec.workspace_location.trim().is_empty(),
        "missing workspace location",
    )?;
    require(req.spec.initializer.is_some(), "missing workspace initializer")?;
    validate_ports(&req.spec.ports)?;
    if req.workspace_type == WorkspaceType::Regular {
        require(
            !req.service_prefix.is_empty(),
            "missing service prefix for regular workspace",
        )?;
    }
    Ok(())
}

/// Port and target must be set and port numbers unique.
pub fn validate_ports(ports: &[PortSpec]) -> Result<(), ManagerError> {
    let mut seen = HashSet::new();
    for spec in ports {
        validate_port(spec)?;
        if !seen.insert(spec.port) {
            return Err(ManagerError::Validation(format!(
                "port {} is not unique",
                spec.port
            )));
        }
    }
    Ok(())
}

/// Port and target must be valid TCP port numbers (1-65535).
pub fn validate_port(spec: &PortSpec) -> Result<(), ManagerError> {
    require(spec.port != 0, "port must not be 0")?;
    if spec.port > MAX_PORT {
        return Err(ManagerError::Validation(format!(
            "port {} is out of range",
            spec.port
        )));
    }
    if spec.target == 0 {
        return Err(ManagerError::Validation(format!(
            "target of port {} must not be 0",
            spec.port
        )));
    }
    if spec.target > MAX_PORT {
        return Err(ManagerError::Validation(format!(
            "target {} of port {} is out of range",
            spec.target, spec.port
        )));
    }
    Ok(())
}

fn require(condition: bool, message: &str) -> Result<(), ManagerError> {
    if condition {
        Ok(())
    } else {
        Err(ManagerError::Validation(message.to_string()))
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
