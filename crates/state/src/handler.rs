// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscribers notified of every change the cache observes.

use crate::index::Delta;
use wsman_core::ClusterObject;

/// Receives add/update/delete notifications from the cache.
///
/// Handlers run on the cache's sync task after the index has been updated,
/// one after another. A slow handler delays later handlers and later events,
/// never the index itself, and is reported in the logs.
pub trait ResourceEventHandler: Send + Sync {
    fn on_add(&self, _object: &ClusterObject) {}

    fn on_update(&self, _old: &ClusterObject, _new: &ClusterObject) {}

    fn on_delete(&self, _object: &ClusterObject) {}
}

type ObjectFn = Box<dyn Fn(&ClusterObject) + Send + Sync>;
type UpdateFn = Box<dyn Fn(&ClusterObject, &ClusterObject) + Send + Sync>;

/// Closure-based handler; unset callbacks ignore the event.
#[derive(Default)]
pub struct HandlerFns {
    add: Option<ObjectFn>,
    update: Option<UpdateFn>,
    delete: Option<ObjectFn>,
}

impl HandlerFns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_add(mut self, f: impl Fn(&ClusterObject) + Send + Sync + 'static) -> Self {
        self.add = Some(Box::new(f));
        self
    }

    pub fn on_update(
        mut self,
        f: impl Fn(&ClusterObject, &ClusterObject) + Send + Sync + 'static,
    ) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    pub fn on_delete(mut self, f: impl Fn(&ClusterObject) + Send + Sync + 'static) -> Self {
        self.delete = Some(Box::new(f));
        self
    }
}

impl ResourceEventHandler for HandlerFns {
    fn on_add(&self, object: &ClusterObject) {
        if let Some(f) = &self.add {
            f(object);
        }
    }

    fn on_update(&self, old: &ClusterObject, new: &ClusterObject) {
        if let Some(f) = &self.update {
            f(old, new);
        }
    }

    fn on_delete(&self, object: &ClusterObject) {
        if let Some(f) = &self.delete {
            f(object);
        }
    }
}

pub(crate) fn deliver(handler: &dyn ResourceEventHandler, delta: &Delta) {
    match delta {
        Delta::Added(o) => handler.on_add(o),
        Delta::Updated { old, new } => handler.on_update(old, new),
        Delta::Deleted(o) => handler.on_delete(o),
    }
}
