// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the cluster API and the ingress port allocator

pub mod cluster;
pub mod ingress;
pub mod traced;

pub use cluster::{ClusterClient, ClusterError, ObjectList, WatchStream};
pub use ingress::{
    AllocatorError, IngressPortAllocator, ListenerAssignment, NoOpIngressPortAllocator,
};
pub use traced::{TracedAllocator, TracedCluster};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use cluster::{ClusterCall, ClusterOp, FakeCluster};
#[cfg(any(test, feature = "test-support"))]
pub use ingress::{AllocatorCall, FakeIngressPortAllocator, FAKE_BASE_INGRESS_PORT};
