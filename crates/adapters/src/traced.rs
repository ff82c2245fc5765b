// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::cluster::{ClusterClient, ClusterError, ObjectList, WatchStream};
use crate::ingress::{AllocatorError, IngressPortAllocator, ListenerAssignment};
use async_trait::async_trait;
use tracing::Instrument;
use wsman_core::{ClusterObject, ObjectKind, WorkspaceId};

/// Wrapper that adds tracing to any ClusterClient
#[derive(Clone)]
pub struct TracedCluster<C> {
    inner: C,
}

impl<C> TracedCluster<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: ClusterClient> ClusterClient for TracedCluster<C> {
    async fn list(&self, namespace: &str, kind: ObjectKind) -> Result<ObjectList, ClusterError> {
        let result = self.inner.list(namespace, kind).await;
        match &result {
            Ok(list) => tracing::debug!(
                %kind,
                namespace,
                items = list.items.len(),
                resource_version = list.resource_version,
                "listed"
            ),
            Err(e) => tracing::warn!(%kind, namespace, error = %e, "list failed"),
        }
        result
    }

    async fn watch(
        &self,
        namespace: &str,
        kind: ObjectKind,
        since_version: u64,
    ) -> Result<WatchStream, ClusterError> {
        let result = self.inner.watch(namespace, kind, since_version).await;
        match &result {
            Ok(_) => tracing::debug!(%kind, namespace, since_version, "watch opened"),
            Err(e) => tracing::warn!(%kind, namespace, error = %e, "watch failed"),
        }
        result
    }

    async fn get(
        &self,
        namespace: &str,
        kind: ObjectKind,
        name: &str,
    ) -> Result<Option<ClusterObject>, ClusterError> {
        let result = self.inner.get(namespace, kind, name).await;
        tracing::trace!(%kind, name, found = ?result.as_ref().ok().map(Option::is_some), "get");
        result
    }

    async fn create(&self, object: ClusterObject) -> Result<ClusterObject, ClusterError> {
        let kind = object.kind();
        let name = object.name().to_string();
        async {
            let start = std::time::Instant::now();
            let result = self.inner.create(object).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(o) => tracing::info!(
                    resource_version = o.resource_version(),
                    elapsed_ms,
                    "created"
                ),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "create failed"),
            }
            result
        }
        .instrument(tracing::info_span!("cluster.create", %kind, name = name.as_str()))
        .await
    }

    async fn update(&self, object: ClusterObject) -> Result<ClusterObject, ClusterError> {
        let kind = object.kind();
        let name = object.name().to_string();
        async {
            let result = self.inner.update(object).await;
            match &result {
                Ok(o) => tracing::info!(resource_version = o.resource_version(), "updated"),
                Err(ClusterError::Conflict { .. }) => tracing::debug!("update conflicted"),
                Err(e) => tracing::error!(error = %e, "update failed"),
            }
            result
        }
        .instrument(tracing::info_span!("cluster.update", %kind, name = name.as_str()))
        .await
    }

    async fn delete(
        &self,
        namespace: &str,
        kind: ObjectKind,
        name: &str,
    ) -> Result<(), ClusterError> {
        let result = self.inner.delete(namespace, kind, name).await;
        tracing::info_span!("cluster.delete", %kind, name).in_scope(|| match &result {
            Ok(()) => tracing::info!("deleted"),
            Err(e) => tracing::warn!(error = %e, "delete failed"),
        });
        result
    }
}

/// Wrapper that adds tracing to any IngressPortAllocator
#[derive(Clone)]
pub struct TracedAllocator<A> {
    inner: A,
}

impl<A> TracedAllocator<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: IngressPortAllocator> IngressPortAllocator for TracedAllocator<A> {
    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    async fn allocate(
        &self,
        id: &WorkspaceId,
        port: u32,
    ) -> Result<ListenerAssignment, AllocatorError> {
        let result = self.inner.allocate(id, port).await;
        tracing::info_span!("ingress.allocate", workspace_id = %id, port).in_scope(|| {
            match &result {
                Ok(a) => tracing::info!(ingress_port = a.ingress_port, "allocated"),
                Err(e) => tracing::warn!(error = %e, "allocation failed"),
            }
        });
        result
    }

    async fn release(&self, id: &WorkspaceId, port: u32) -> Result<(), AllocatorError> {
        let result = self.inner.release(id, port).await;
        match &result {
            Ok(()) => tracing::info!(workspace_id = %id, port, "released"),
            Err(e) => tracing::warn!(workspace_id = %id, port, error = %e, "release failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
