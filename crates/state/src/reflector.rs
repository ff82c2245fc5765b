// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sync task keeping a [`ClusterStateCache`] in step with the cluster.
//!
//! For each object kind the task lists, replaces the index with the listing,
//! then watches from the listing's resource version. A watch stream that
//! ends, a failed call, or the periodic resync all lead back to a relist.

use crate::backoff::Backoff;
use crate::cache::ClusterStateCache;
use std::future::pending;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};
use wsman_adapters::{ClusterClient, ClusterError, WatchStream};
use wsman_core::{ObjectKind, WatchEvent};

enum Step {
    Stop,
    Event(ObjectKind, Option<WatchEvent>),
    Resync,
}

pub(crate) struct Reflector<C> {
    cache: Arc<ClusterStateCache>,
    client: C,
    stop: watch::Receiver<bool>,
    pods: Option<WatchStream>,
    services: Option<WatchStream>,
    records: Option<WatchStream>,
    backoff: Backoff,
}

impl<C: ClusterClient> Reflector<C> {
    pub(crate) fn new(
        cache: Arc<ClusterStateCache>,
        client: C,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            cache,
            client,
            stop,
            pods: None,
            services: None,
            records: None,
            backoff: Backoff::default(),
        }
    }

    pub(crate) async fn run(mut self) {
        let namespace = self.cache.namespace().to_string();
        tracing::info!(%namespace, "cluster state sync started");

        let mut resync = self.cache.config().resync_period.map(|period| {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        while !self.is_stopped() {
            let mut stop = self.stop.clone();
            let connected = tokio::select! {
                biased;
                _ = stop.changed() => continue,
                result = self.connect() => result,
            };
            if let Err(e) = connected {
                let delay = self.backoff.next_delay();
                tracing::warn!(
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "cluster sync failed, retrying"
                );
                tokio::select! {
                    _ = self.stop.changed() => {}
                    _ = tokio::time::sleep(delay) => {}
                }
                continue;
            }
            self.backoff.reset();

            let step = tokio::select! {
                biased;
                _ = self.stop.changed() => Step::Stop,
                event = recv(&mut self.pods) => Step::Event(ObjectKind::Pod, event),
                event = recv(&mut self.services) => Step::Event(ObjectKind::Service, event),
                event = recv(&mut self.records) => Step::Event(ObjectKind::LifecycleRecord, event),
                _ = tick(&mut resync) => Step::Resync,
            };

            match step {
                Step::Stop => {}
                Step::Event(_, Some(event)) => self.cache.apply(event),
                Step::Event(kind, None) => {
                    tracing::debug!(%kind, "watch stream ended, relisting");
                    *self.stream(kind) = None;
                }
                Step::Resync => {
                    tracing::debug!("periodic resync");
                    for kind in ObjectKind::ALL {
                        *self.stream(kind) = None;
                    }
                }
            }
        }
        tracing::info!(%namespace, "cluster state sync stopped");
    }

    fn is_stopped(&self) -> bool {
        *self.stop.borrow() || self.stop.has_changed().is_err()
    }

    fn stream(&mut self, kind: ObjectKind) -> &mut Option<WatchStream> {
        match kind {
            ObjectKind::Pod => &mut self.pods,
            ObjectKind::Service => &mut self.services,
            ObjectKind::LifecycleRecord => &mut self.records,
        }
    }

    /// Relist and rewatch every kind that has no open stream.
    async fn connect(&mut self) -> Result<(), ClusterError> {
        for kind in ObjectKind::ALL {
            if self.stream(kind).is_some() {
                continue;
            }
            let namespace = self.cache.namespace().to_string();
            let list = self.client.list(&namespace, kind).await?;
            self.cache.replace(kind, list.items, list.resource_version);
            let since = self.cache.watermark(kind);
            let stream = self.client.watch(&namespace, kind, since).await?;
            *self.stream(kind) = Some(stream);
        }
        Ok(())
    }
}

async fn recv(stream: &mut Option<WatchStream>) -> Option<WatchEvent> {
    match stream {
        Some(rx) => rx.recv().await,
        None => pending().await,
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending().await,
    }
}
