// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-kind object index materialized from list and watch results.
//!
//! Each index is owned by the cache's sync task and shared with readers as an
//! immutable `Arc` snapshot; the sync task mutates a copy-on-write clone.

use std::collections::{BTreeMap, BTreeSet};
use wsman_core::{
    ClusterObject, ComputeUnit, LifecycleRecord, ObjectKind, ObjectMeta, PortsService,
    WatchEvent, WorkspaceId,
};

/// An object type with its own sub-cache.
pub trait CachedObject: Clone + Send + Sync + 'static {
    const KIND: ObjectKind;

    fn meta(&self) -> &ObjectMeta;

    fn from_object(object: ClusterObject) -> Option<Self>;

    fn to_object(&self) -> ClusterObject;
}

impl CachedObject for ComputeUnit {
    const KIND: ObjectKind = ObjectKind::Pod;

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn from_object(object: ClusterObject) -> Option<Self> {
        match object {
            ClusterObject::Pod(o) => Some(o),
            _ => None,
        }
    }

    fn to_object(&self) -> ClusterObject {
        ClusterObject::Pod(self.clone())
    }
}

impl CachedObject for PortsService {
    const KIND: ObjectKind = ObjectKind::Service;

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn from_object(object: ClusterObject) -> Option<Self> {
        match object {
            ClusterObject::Service(o) => Some(o),
            _ => None,
        }
    }

    fn to_object(&self) -> ClusterObject {
        ClusterObject::Service(self.clone())
    }
}

impl CachedObject for LifecycleRecord {
    const KIND: ObjectKind = ObjectKind::LifecycleRecord;

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn from_object(object: ClusterObject) -> Option<Self> {
        match object {
            ClusterObject::LifecycleRecord(o) => Some(o),
            _ => None,
        }
    }

    fn to_object(&self) -> ClusterObject {
        ClusterObject::LifecycleRecord(self.clone())
    }
}

/// A change applied to an index, handed to event handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    Added(ClusterObject),
    Updated {
        old: ClusterObject,
        new: ClusterObject,
    },
    Deleted(ClusterObject),
}

/// Objects of one kind keyed by name, with a secondary index on the
/// `workspaceID` label.
#[derive(Debug, Clone)]
pub struct KindIndex<T> {
    objects: BTreeMap<String, T>,
    by_workspace: BTreeMap<WorkspaceId, BTreeSet<String>>,
    /// Highest resource version reflected in this index
    watermark: u64,
}

impl<T> Default for KindIndex<T> {
    fn default() -> Self {
        Self {
            objects: BTreeMap::new(),
            by_workspace: BTreeMap::new(),
            watermark: 0,
        }
    }
}

impl<T: CachedObject> KindIndex<T> {
    pub fn get(&self, name: &str) -> Option<&T> {
        self.objects.get(name)
    }

    /// All objects labelled with the workspace identity, in name order.
    pub fn for_workspace(&self, id: &WorkspaceId) -> Vec<&T> {
        self.by_workspace
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|name| self.objects.get(name))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.objects.values()
    }

    pub fn workspace_ids(&self) -> impl Iterator<Item = &WorkspaceId> {
        self.by_workspace.keys()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn watermark(&self) -> u64 {
        self.watermark
    }

    /// Apply a watch event.
    ///
    /// Events not newer than the watermark are already reflected (or
    /// superseded by a relist) and are dropped, so the index never moves
    /// backwards.
    pub fn apply(&mut self, event: WatchEvent) -> Option<Delta> {
        let version = event.object().resource_version();
        if version <= self.watermark {
            return None;
        }
        self.watermark = version;

        match event {
            WatchEvent::Added(object) | WatchEvent::Modified(object) => {
                let new = T::from_object(object)?;
                match self.insert(new.clone()) {
                    Some(old) => Some(Delta::Updated {
                        old: old.to_object(),
                        new: new.to_object(),
                    }),
                    None => Some(Delta::Added(new.to_object())),
                }
            }
            WatchEvent::Deleted(object) => {
                let old = self.remove(object.name())?;
                Some(Delta::Deleted(old.to_object()))
            }
        }
    }

    /// Replace the whole index with a full listing, returning the deltas that
    /// bring an observer of the old state up to date.
    pub fn replace(&mut self, items: Vec<ClusterObject>, list_version: u64) -> Vec<Delta> {
        let mut listed: BTreeMap<String, T> = BTreeMap::new();
        for item in items {
            if let Some(object) = T::from_object(item) {
                listed.insert(object.meta().name.clone(), object);
            }
        }

        let mut deltas = Vec::new();
        let stale: Vec<String> = self
            .objects
            .keys()
            .filter(|name| !listed.contains_key(*name))
            .cloned()
            .collect();
        for name in stale {
            if let Some(old) = self.remove(&name) {
                deltas.push(Delta::Deleted(old.to_object()));
            }
        }
        for (_, object) in listed {
            let version = object.meta().resource_version;
            match self.insert(object.clone()) {
                Some(old) if old.meta().resource_version != version => {
                    deltas.push(Delta::Updated {
                        old: old.to_object(),
                        new: object.to_object(),
                    });
                }
                Some(_) => {}
                None => deltas.push(Delta::Added(object.to_object())),
            }
        }
        self.watermark = self.watermark.max(list_version);
        deltas
    }

    fn insert(&mut self, object: T) -> Option<T> {
        let name = object.meta().name.clone();
        let old = self.remove(&name);
        if let Some(id) = object.meta().workspace_id() {
            self.by_workspace
                .entry(id)
                .or_default()
                .insert(name.clone());
        }
        self.objects.insert(name, object);
        old
    }

    fn remove(&mut self, name: &str) -> Option<T> {
        let old = self.objects.remove(name)?;
        if let Some(id) = old.meta().workspace_id() {
            if let Some(names) = self.by_workspace.get_mut(&id) {
                names.remove(name);
                if names.is_empty() {
                    self.by_workspace.remove(&id);
                }
            }
        }
        Some(old)
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
