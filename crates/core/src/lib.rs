// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wsman-core: shared types of the workspace manager control plane

pub mod id;
pub mod naming;
pub mod object;
pub mod request;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use id::{MetaId, OwnerId, WorkspaceId};
pub use object::{
    ClusterObject, ComputeUnit, LifecycleRecord, ObjectKind, ObjectMeta, PortsService, Protocol,
    ServicePort, UnitPhase, WatchEvent,
};
pub use request::{
    ControlPortRequest, ControlPortResponse, GetWorkspacesRequest, Initializer, StartMetadata,
    StartWorkspaceRequest, StartWorkspaceResponse, StartWorkspaceSpec,
};
pub use workspace::{
    sort_ports, PortSpec, PortVisibility, WorkspaceConditions, WorkspaceMetadata, WorkspacePhase,
    WorkspaceStatus, WorkspaceType,
};
