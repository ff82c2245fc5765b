// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ingress port allocator adapters

mod noop;

pub use noop::NoOpIngressPortAllocator;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{AllocatorCall, FakeIngressPortAllocator, FAKE_BASE_INGRESS_PORT};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wsman_core::WorkspaceId;

/// Errors from allocator operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocatorError {
    #[error("no ingress ports left: {0}")]
    Exhausted(String),
    #[error("ingress port allocation is not configured")]
    Unsupported,
    #[error("allocator failed: {0}")]
    Failed(String),
}

/// An externally routable listener assigned to one workspace port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerAssignment {
    pub ingress_port: u32,
}

/// Adapter for the service assigning ingress listeners to workspace ports.
///
/// Allocation is keyed by `(workspace, port)`; allocating an already
/// assigned pair returns the existing assignment.
#[async_trait]
pub trait IngressPortAllocator: Clone + Send + Sync + 'static {
    /// Whether public exposure is possible at all
    fn is_enabled(&self) -> bool {
        true
    }

    /// Assign an ingress listener to a workspace port
    async fn allocate(
        &self,
        id: &WorkspaceId,
        port: u32,
    ) -> Result<ListenerAssignment, AllocatorError>;

    /// Give up the listener of a workspace port; releasing an unassigned port is a no-op
    async fn release(&self, id: &WorkspaceId, port: u32) -> Result<(), AllocatorError>;
}
