// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster state cache: an eventually consistent mirror of the workspace
//! objects in one namespace.
//!
//! The cache is only ever written by its own sync task (see
//! [`crate::reflector`]). Readers get independent values or `Arc` snapshots
//! and never block on cluster I/O.

use crate::handler::{deliver, ResourceEventHandler};
use crate::index::{CachedObject, Delta, KindIndex};
use crate::reflector::Reflector;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use wsman_adapters::ClusterClient;
use wsman_core::{
    ClusterObject, ComputeUnit, LifecycleRecord, ObjectKind, PortsService, WatchEvent,
    WorkspaceId,
};

/// Errors from cache operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache not synced within {0:?}")]
    SyncTimeout(Duration),
}

/// Cache settings
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Namespace whose objects are mirrored
    pub namespace: String,
    /// Full relist interval; `None` relists only after watch failures
    pub resync_period: Option<Duration>,
    /// Handlers taking longer than this are logged as slow
    pub slow_handler: Duration,
}

impl CacheConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            resync_period: None,
            slow_handler: Duration::from_millis(100),
        }
    }
}

/// Consistent view over all three sub-caches at one moment.
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    pub pods: Arc<KindIndex<ComputeUnit>>,
    pub services: Arc<KindIndex<PortsService>>,
    pub records: Arc<KindIndex<LifecycleRecord>>,
}

impl CacheSnapshot {
    /// Every identity that has a compute unit or a lifecycle record.
    pub fn workspace_ids(&self) -> BTreeSet<WorkspaceId> {
        self.pods
            .workspace_ids()
            .chain(self.records.workspace_ids())
            .cloned()
            .collect()
    }
}

pub struct ClusterStateCache {
    config: CacheConfig,
    pods: RwLock<Arc<KindIndex<ComputeUnit>>>,
    services: RwLock<Arc<KindIndex<PortsService>>>,
    records: RwLock<Arc<KindIndex<LifecycleRecord>>>,
    handlers: RwLock<Vec<Arc<dyn ResourceEventHandler>>>,
    synced_kinds: Mutex<BTreeSet<ObjectKind>>,
    synced: watch::Sender<bool>,
}

impl ClusterStateCache {
    pub fn new(config: CacheConfig) -> Arc<Self> {
        let (synced, _) = watch::channel(false);
        Arc::new(Self {
            config,
            pods: RwLock::default(),
            services: RwLock::default(),
            records: RwLock::default(),
            handlers: RwLock::default(),
            synced_kinds: Mutex::default(),
            synced,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// Start mirroring the cluster in the background and return immediately.
    ///
    /// Synchronization runs until `stop` turns `true` or its sender is
    /// dropped. Must be called from within a tokio runtime.
    pub fn run<C: ClusterClient>(
        self: &Arc<Self>,
        client: C,
        stop: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let reflector = Reflector::new(Arc::clone(self), client, stop);
        tokio::spawn(reflector.run())
    }

    /// Register a handler for all future changes.
    pub fn add_event_handler(&self, handler: Arc<dyn ResourceEventHandler>) {
        self.handlers.write().push(handler);
    }

    /// Whether every object kind has completed its initial list.
    pub fn has_synced(&self) -> bool {
        *self.synced.borrow()
    }

    /// Wait until [`has_synced`](Self::has_synced) or the timeout expires.
    pub async fn wait_for_sync(&self, timeout: Duration) -> Result<(), CacheError> {
        let mut rx = self.synced.subscribe();
        let synced = matches!(
            tokio::time::timeout(timeout, rx.wait_for(|synced| *synced)).await,
            Ok(Ok(_))
        );
        if synced {
            Ok(())
        } else {
            Err(CacheError::SyncTimeout(timeout))
        }
    }

    // ── Reads ──────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            pods: self.pods.read().clone(),
            services: self.services.read().clone(),
            records: self.records.read().clone(),
        }
    }

    /// Ports service by name.
    pub fn get_service(&self, name: &str) -> Option<PortsService> {
        self.services.read().get(name).cloned()
    }

    /// All compute units labelled with the identity, terminated ones included.
    pub fn get_pods(&self, id: &WorkspaceId) -> Vec<ComputeUnit> {
        self.pods
            .read()
            .for_workspace(id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn get_lifecycle_record(&self, id: &WorkspaceId) -> Option<LifecycleRecord> {
        self.records
            .read()
            .for_workspace(id)
            .into_iter()
            .next()
            .cloned()
    }

    pub fn list_pods(&self) -> Vec<ComputeUnit> {
        self.pods.read().iter().cloned().collect()
    }

    pub fn workspace_ids(&self) -> BTreeSet<WorkspaceId> {
        self.snapshot().workspace_ids()
    }

    // ── Writes (sync task only) ────────────────────────────────────────────

    pub(crate) fn watermark(&self, kind: ObjectKind) -> u64 {
        match kind {
            ObjectKind::Pod => self.pods.read().watermark(),
            ObjectKind::Service => self.services.read().watermark(),
            ObjectKind::LifecycleRecord => self.records.read().watermark(),
        }
    }

    pub(crate) fn apply(&self, event: WatchEvent) {
        let delta = match event.object().kind() {
            ObjectKind::Pod => apply_event(&self.pods, event),
            ObjectKind::Service => apply_event(&self.services, event),
            ObjectKind::LifecycleRecord => apply_event(&self.records, event),
        };
        if let Some(delta) = delta {
            self.dispatch(&[delta]);
        }
    }

    pub(crate) fn replace(&self, kind: ObjectKind, items: Vec<ClusterObject>, version: u64) {
        let deltas = match kind {
            ObjectKind::Pod => replace_index(&self.pods, items, version),
            ObjectKind::Service => replace_index(&self.services, items, version),
            ObjectKind::LifecycleRecord => replace_index(&self.records, items, version),
        };
        if !deltas.is_empty() {
            tracing::debug!(%kind, changes = deltas.len(), "relist reconciled changes");
        }
        self.mark_synced(kind);
        self.dispatch(&deltas);
    }

    fn mark_synced(&self, kind: ObjectKind) {
        if self.has_synced() {
            return;
        }
        let mut kinds = self.synced_kinds.lock();
        kinds.insert(kind);
        if kinds.len() == ObjectKind::ALL.len() {
            tracing::info!(namespace = %self.config.namespace, "cluster state cache synced");
            self.synced.send_replace(true);
        }
    }

    fn dispatch(&self, deltas: &[Delta]) {
        if deltas.is_empty() {
            return;
        }
        let handlers = self.handlers.read().clone();
        for delta in deltas {
            for handler in &handlers {
                let start = Instant::now();
                deliver(handler.as_ref(), delta);
                let elapsed = start.elapsed();
                if elapsed > self.config.slow_handler {
                    tracing::warn!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        "slow cache event handler"
                    );
                }
            }
        }
    }
}

fn apply_event<T: CachedObject>(
    lock: &RwLock<Arc<KindIndex<T>>>,
    event: WatchEvent,
) -> Option<Delta> {
    let mut guard = lock.write();
    Arc::make_mut(&mut guard).apply(event)
}

fn replace_index<T: CachedObject>(
    lock: &RwLock<Arc<KindIndex<T>>>,
    items: Vec<ClusterObject>,
    version: u64,
) -> Vec<Delta> {
    let mut guard = lock.write();
    Arc::make_mut(&mut guard).replace(items, version)
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
