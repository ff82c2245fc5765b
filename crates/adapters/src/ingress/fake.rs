// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake ingress port allocator for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AllocatorError, IngressPortAllocator, ListenerAssignment};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use wsman_core::WorkspaceId;

/// First ingress port handed out by the fake
pub const FAKE_BASE_INGRESS_PORT: u32 = 10000;

/// Recorded allocator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocatorCall {
    Allocate { id: WorkspaceId, port: u32 },
    Release { id: WorkspaceId, port: u32 },
}

struct FakeAllocatorState {
    assignments: BTreeMap<(WorkspaceId, u32), u32>,
    calls: Vec<AllocatorCall>,
    next_port: u32,
    capacity: usize,
    fail_next: Option<AllocatorError>,
    delay: Option<Duration>,
}

/// Fake allocator handing out sequential ingress ports from
/// [`FAKE_BASE_INGRESS_PORT`] up to a capacity.
#[derive(Clone)]
pub struct FakeIngressPortAllocator {
    inner: Arc<Mutex<FakeAllocatorState>>,
}

impl Default for FakeIngressPortAllocator {
    fn default() -> Self {
        Self::with_capacity(usize::MAX)
    }
}

impl FakeIngressPortAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeAllocatorState {
                assignments: BTreeMap::new(),
                calls: Vec::new(),
                next_port: FAKE_BASE_INGRESS_PORT,
                capacity,
                fail_next: None,
                delay: None,
            })),
        }
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<AllocatorCall> {
        self.inner.lock().calls.clone()
    }

    /// Current assignments keyed by `(workspace, port)`
    pub fn assignments(&self) -> BTreeMap<(WorkspaceId, u32), u32> {
        self.inner.lock().assignments.clone()
    }

    /// Make the next `allocate` fail with `error`
    pub fn fail_next(&self, error: AllocatorError) {
        self.inner.lock().fail_next = Some(error);
    }

    /// Make every `allocate` wait before answering
    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().delay = Some(delay);
    }
}

#[async_trait]
impl IngressPortAllocator for FakeIngressPortAllocator {
    async fn allocate(
        &self,
        id: &WorkspaceId,
        port: u32,
    ) -> Result<ListenerAssignment, AllocatorError> {
        let delay = self.inner.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut inner = self.inner.lock();
        inner.calls.push(AllocatorCall::Allocate {
            id: id.clone(),
            port,
        });
        if let Some(e) = inner.fail_next.take() {
            return Err(e);
        }

        let key = (id.clone(), port);
        if let Some(&ingress_port) = inner.assignments.get(&key) {
            return Ok(ListenerAssignment { ingress_port });
        }
        if inner.assignments.len() >= inner.capacity {
            return Err(AllocatorError::Exhausted(format!(
                "all {} ingress ports are assigned",
                inner.capacity
            )));
        }
        let ingress_port = inner.next_port;
        inner.next_port += 1;
        inner.assignments.insert(key, ingress_port);
        Ok(ListenerAssignment { ingress_port })
    }

    async fn release(&self, id: &WorkspaceId, port: u32) -> Result<(), AllocatorError> {
        let mut inner = self.inner.lock();
        inner.calls.push(AllocatorCall::Release {
            id: id.clone(),
            port,
        });
        inner.assignments.remove(&(id.clone(), port));
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
