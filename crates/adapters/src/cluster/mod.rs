// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster API adapters

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ClusterCall, ClusterOp, FakeCluster};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use wsman_core::{ClusterObject, ObjectKind, WatchEvent};

/// Errors from cluster operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("{kind} {name} not found")]
    NotFound { kind: ObjectKind, name: String },
    #[error("{kind} {name} already exists")]
    AlreadyExists { kind: ObjectKind, name: String },
    /// The object changed since it was read (stale resource version)
    #[error("conflict writing {kind} {name}: object has been modified")]
    Conflict { kind: ObjectKind, name: String },
    #[error("cluster unavailable: {0}")]
    Unavailable(String),
}

/// Full listing of one object kind at a point in time.
#[derive(Debug, Clone, Default)]
pub struct ObjectList {
    pub items: Vec<ClusterObject>,
    /// Resource version the listing is consistent with; watches resume from here
    pub resource_version: u64,
}

/// Stream of watch events. The stream ending means the watch broke and the
/// consumer has to relist.
pub type WatchStream = mpsc::Receiver<WatchEvent>;

/// Adapter for the cluster API holding the workspace objects.
#[async_trait]
pub trait ClusterClient: Clone + Send + Sync + 'static {
    /// List all objects of a kind in a namespace
    async fn list(&self, namespace: &str, kind: ObjectKind) -> Result<ObjectList, ClusterError>;

    /// Watch a kind for changes newer than `since_version`
    async fn watch(
        &self,
        namespace: &str,
        kind: ObjectKind,
        since_version: u64,
    ) -> Result<WatchStream, ClusterError>;

    /// Read a single object directly from the cluster
    async fn get(
        &self,
        namespace: &str,
        kind: ObjectKind,
        name: &str,
    ) -> Result<Option<ClusterObject>, ClusterError>;

    /// Create an object; fails with `AlreadyExists` if the name is taken
    async fn create(&self, object: ClusterObject) -> Result<ClusterObject, ClusterError>;

    /// Replace an object. The object's resource version must match the
    /// stored one, otherwise the write fails with `Conflict`.
    async fn update(&self, object: ClusterObject) -> Result<ClusterObject, ClusterError>;

    /// Delete an object by name
    async fn delete(&self, namespace: &str, kind: ObjectKind, name: &str)
        -> Result<(), ClusterError>;
}
