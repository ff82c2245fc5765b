// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory cluster for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ClusterClient, ClusterError, ObjectList, WatchStream};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use wsman_core::{ClusterObject, ObjectKind, WatchEvent};

/// Buffered events per watcher before the fake drops the watch (forcing a relist)
const WATCH_BUFFER: usize = 256;

/// Operation selector for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterOp {
    List,
    Watch,
    Get,
    Create,
    Update,
    Delete,
}

/// Recorded cluster call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterCall {
    List {
        kind: ObjectKind,
    },
    Watch {
        kind: ObjectKind,
        since_version: u64,
    },
    Get {
        kind: ObjectKind,
        name: String,
    },
    Create {
        object: ClusterObject,
    },
    Update {
        object: ClusterObject,
    },
    Delete {
        kind: ObjectKind,
        name: String,
    },
}

type ObjectKey = (ObjectKind, String, String);

struct Watcher {
    kind: ObjectKind,
    namespace: String,
    tx: mpsc::Sender<WatchEvent>,
}

struct FakeClusterState {
    objects: BTreeMap<ObjectKey, ClusterObject>,
    history: Vec<(String, WatchEvent)>,
    watchers: Vec<Watcher>,
    version: u64,
    calls: Vec<ClusterCall>,
    failures: HashMap<ClusterOp, ClusterError>,
    delays: HashMap<ClusterOp, Duration>,
}

impl FakeClusterState {
    fn next_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    /// Record the event and fan it out; watchers that are gone or full are dropped.
    fn publish(&mut self, event: WatchEvent) {
        let object = event.object();
        let kind = object.kind();
        let namespace = object.meta().namespace.clone();
        self.watchers.retain(|w| {
            if w.kind != kind || w.namespace != namespace {
                return !w.tx.is_closed();
            }
            w.tx.try_send(event.clone()).is_ok()
        });
        self.history.push((namespace, event));
    }

    fn take_failure(&mut self, op: ClusterOp) -> Result<(), ClusterError> {
        match self.failures.remove(&op) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn key_of(object: &ClusterObject) -> ObjectKey {
    let meta = object.meta();
    (object.kind(), meta.namespace.clone(), meta.name.clone())
}

/// Fake cluster for testing.
///
/// Behaves like a single-node API server: assigns resource versions, rejects
/// stale updates with `Conflict`, and delivers watch events for every write
/// (including writes made through the test helpers).
#[derive(Clone)]
pub struct FakeCluster {
    inner: Arc<Mutex<FakeClusterState>>,
}

impl Default for FakeCluster {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClusterState {
                objects: BTreeMap::new(),
                history: Vec::new(),
                watchers: Vec::new(),
                version: 0,
                calls: Vec::new(),
                failures: HashMap::new(),
                delays: HashMap::new(),
            })),
        }
    }
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cluster pre-populated with objects.
    pub fn with_objects(objects: impl IntoIterator<Item = ClusterObject>) -> Self {
        let cluster = Self::new();
        for object in objects {
            cluster.apply(object);
        }
        cluster
    }

    /// Create or replace an object, bypassing version checks and call recording.
    pub fn apply(&self, object: impl Into<ClusterObject>) -> ClusterObject {
        let mut object = object.into();
        let mut inner = self.inner.lock();
        let key = key_of(&object);
        object.meta_mut().resource_version = inner.next_version();
        let event = if inner.objects.contains_key(&key) {
            WatchEvent::Modified(object.clone())
        } else {
            WatchEvent::Added(object.clone())
        };
        inner.objects.insert(key, object.clone());
        inner.publish(event);
        object
    }

    /// Remove an object, bypassing call recording. Returns whether it existed.
    pub fn remove(&self, namespace: &str, kind: ObjectKind, name: &str) -> bool {
        let mut inner = self.inner.lock();
        let key = (kind, namespace.to_string(), name.to_string());
        match inner.objects.remove(&key) {
            Some(mut object) => {
                object.meta_mut().resource_version = inner.next_version();
                inner.publish(WatchEvent::Deleted(object));
                true
            }
            None => false,
        }
    }

    /// Current stored copy of an object.
    pub fn object(&self, namespace: &str, kind: ObjectKind, name: &str) -> Option<ClusterObject> {
        let key = (kind, namespace.to_string(), name.to_string());
        self.inner.lock().objects.get(&key).cloned()
    }

    /// Make the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: ClusterOp, error: ClusterError) {
        self.inner.lock().failures.insert(op, error);
    }

    /// Delay every response to `op` by `delay`. The call takes effect
    /// before the delay, like a write whose response is lost in transit.
    pub fn set_delay(&self, op: ClusterOp, delay: Duration) {
        self.inner.lock().delays.insert(op, delay);
    }

    /// Close every open watch stream, as if the API server dropped them.
    pub fn break_watches(&self) {
        self.inner.lock().watchers.clear();
    }

    /// Number of open watch streams.
    pub fn watcher_count(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.watchers.retain(|w| !w.tx.is_closed());
        inner.watchers.len()
    }

    async fn respond(&self, op: ClusterOp) {
        let delay = self.inner.lock().delays.get(&op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ClusterCall> {
        self.inner.lock().calls.clone()
    }

    /// Recorded write calls only (create, update, delete)
    pub fn writes(&self) -> Vec<ClusterCall> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    ClusterCall::Create { .. }
                        | ClusterCall::Update { .. }
                        | ClusterCall::Delete { .. }
                )
            })
            .collect()
    }
}

// Call bodies; effects land here, before any response delay
impl FakeCluster {
    fn list_now(&self, namespace: &str, kind: ObjectKind) -> Result<ObjectList, ClusterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ClusterCall::List { kind });
        inner.take_failure(ClusterOp::List)?;

        let items = inner
            .objects
            .iter()
            .filter(|((k, ns, _), _)| *k == kind && ns == namespace)
            .map(|(_, o)| o.clone())
            .collect();
        Ok(ObjectList {
            items,
            resource_version: inner.version,
        })
    }

    fn watch_now(
        &self,
        namespace: &str,
        kind: ObjectKind,
        since_version: u64,
    ) -> Result<WatchStream, ClusterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ClusterCall::Watch {
            kind,
            since_version,
        });
        inner.take_failure(ClusterOp::Watch)?;

        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        for (ns, event) in &inner.history {
            let object = event.object();
            if ns == namespace && object.kind() == kind && object.resource_version() > since_version
            {
                if tx.try_send(event.clone()).is_err() {
                    // Too far behind; an immediately closed stream forces a relist
                    return Ok(rx);
                }
            }
        }
        inner.watchers.push(Watcher {
            kind,
            namespace: namespace.to_string(),
            tx,
        });
        Ok(rx)
    }

    fn get_now(
        &self,
        namespace: &str,
        kind: ObjectKind,
        name: &str,
    ) -> Result<Option<ClusterObject>, ClusterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ClusterCall::Get {
            kind,
            name: name.to_string(),
        });
        inner.take_failure(ClusterOp::Get)?;

        let key = (kind, namespace.to_string(), name.to_string());
        Ok(inner.objects.get(&key).cloned())
    }

    fn create_now(&self, mut object: ClusterObject) -> Result<ClusterObject, ClusterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ClusterCall::Create {
            object: object.clone(),
        });
        inner.take_failure(ClusterOp::Create)?;

        let key = key_of(&object);
        if inner.objects.contains_key(&key) {
            return Err(ClusterError::AlreadyExists {
                kind: key.0,
                name: key.2,
            });
        }
        object.meta_mut().resource_version = inner.next_version();
        inner.objects.insert(key, object.clone());
        inner.publish(WatchEvent::Added(object.clone()));
        Ok(object)
    }

    fn update_now(&self, mut object: ClusterObject) -> Result<ClusterObject, ClusterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ClusterCall::Update {
            object: object.clone(),
        });
        inner.take_failure(ClusterOp::Update)?;

        let key = key_of(&object);
        let stored_version = match inner.objects.get(&key) {
            Some(stored) => stored.resource_version(),
            None => {
                return Err(ClusterError::NotFound {
                    kind: key.0,
                    name: key.2,
                })
            }
        };
        if stored_version != object.resource_version() {
            return Err(ClusterError::Conflict {
                kind: key.0,
                name: key.2,
            });
        }
        object.meta_mut().resource_version = inner.next_version();
        inner.objects.insert(key, object.clone());
        inner.publish(WatchEvent::Modified(object.clone()));
        Ok(object)
    }

    fn delete_now(
        &self,
        namespace: &str,
        kind: ObjectKind,
        name: &str,
    ) -> Result<(), ClusterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ClusterCall::Delete {
            kind,
            name: name.to_string(),
        });
        inner.take_failure(ClusterOp::Delete)?;

        let key = (kind, namespace.to_string(), name.to_string());
        match inner.objects.remove(&key) {
            Some(mut object) => {
                object.meta_mut().resource_version = inner.next_version();
                inner.publish(WatchEvent::Deleted(object));
                Ok(())
            }
            None => Err(ClusterError::NotFound {
                kind,
                name: name.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ClusterClient for FakeCluster {
    async fn list(&self, namespace: &str, kind: ObjectKind) -> Result<ObjectList, ClusterError> {
        let result = self.list_now(namespace, kind);
        self.respond(ClusterOp::List).await;
        result
    }

    async fn watch(
        &self,
        namespace: &str,
        kind: ObjectKind,
        since_version: u64,
    ) -> Result<WatchStream, ClusterError> {
        let result = self.watch_now(namespace, kind, since_version);
        self.respond(ClusterOp::Watch).await;
        result
    }

    async fn get(
        &self,
        namespace: &str,
        kind: ObjectKind,
        name: &str,
    ) -> Result<Option<ClusterObject>, ClusterError> {
        let result = self.get_now(namespace, kind, name);
        self.respond(ClusterOp::Get).await;
        result
    }

    async fn create(&self, object: ClusterObject) -> Result<ClusterObject, ClusterError> {
        let result = self.create_now(object);
        self.respond(ClusterOp::Create).await;
        result
    }

    async fn update(&self, object: ClusterObject) -> Result<ClusterObject, ClusterError> {
        let result = self.update_now(object);
        self.respond(ClusterOp::Update).await;
        result
    }

    async fn delete(
        &self,
        namespace: &str,
        kind: ObjectKind,
        name: &str,
    ) -> Result<(), ClusterError> {
        let result = self.delete_now(namespace, kind, name);
        self.respond(ClusterOp::Delete).await;
        result
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
