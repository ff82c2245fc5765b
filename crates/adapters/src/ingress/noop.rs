// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op ingress port allocator.

use super::{AllocatorError, IngressPortAllocator, ListenerAssignment};
use async_trait::async_trait;
use wsman_core::WorkspaceId;

/// Allocator for deployments without ingress.
///
/// Public exposure fails with [`AllocatorError::Unsupported`] so callers
/// never silently fall back to private ports.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpIngressPortAllocator;

impl NoOpIngressPortAllocator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IngressPortAllocator for NoOpIngressPortAllocator {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn allocate(
        &self,
        _id: &WorkspaceId,
        _port: u32,
    ) -> Result<ListenerAssignment, AllocatorError> {
        Err(AllocatorError::Unsupported)
    }

    async fn release(&self, _id: &WorkspaceId, _port: u32) -> Result<(), AllocatorError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
