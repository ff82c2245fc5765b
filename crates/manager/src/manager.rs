// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workspace manager: the entry point of every control-plane call.
//!
//! Reads are answered from the cluster state cache. Port mutations go to
//! the cluster directly and are reported back without waiting for the cache
//! to observe them.

use crate::config::{Config, ConfigError};
use crate::deadline::{deadline_in, remaining, within};
use crate::error::ManagerError;
use crate::locate;
use crate::locks::WorkspaceLocks;
use crate::notify::{StatusBroadcaster, StatusSubscription};
use crate::ports::PortController;
use crate::start::{DefinitePodBuilder, StartContextBuilder};
use crate::status::{self, compute_status, project_status, PortUrls};
use crate::validate;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use wsman_adapters::{
    ClusterClient, ClusterError, IngressPortAllocator, TracedAllocator, TracedCluster,
};
use wsman_core::{
    ClusterObject, ComputeUnit, ControlPortRequest, ControlPortResponse, GetWorkspacesRequest,
    StartWorkspaceRequest, StartWorkspaceResponse, UnitPhase, WorkspaceId, WorkspaceStatus,
};
use wsman_state::{ClusterStateCache, ResourceEventHandler};

pub struct Manager<C, A> {
    config: Config,
    cluster: TracedCluster<C>,
    allocator: TracedAllocator<A>,
    cache: Arc<ClusterStateCache>,
    urls: PortUrls,
    notifier: StatusBroadcaster,
    locks: WorkspaceLocks,
    builder: Box<dyn StartContextBuilder>,
}

impl<C: ClusterClient, A: IngressPortAllocator> Manager<C, A> {
    /// Build a manager over `cluster`. Nothing is read until [`Manager::run`].
    ///
    /// Port URLs are only reported when the allocator is enabled and a URL
    /// template is configured.
    pub fn new(config: Config, cluster: C, allocator: A) -> Result<Self, ConfigError> {
        config.validate()?;
        let template = if allocator.is_enabled() {
            config.url_template()?
        } else {
            if config.workspace_port_url_template.is_some() {
                tracing::info!("no ingress port allocator, port url template unused");
            }
            None
        };
        let urls = PortUrls::new(config.ingress_host.clone(), template);
        let cache = ClusterStateCache::new(config.cache_config());
        let notifier = StatusBroadcaster::new(config.status_channel_capacity);
        cache.add_event_handler(Arc::new(StatusForwarder {
            cache: Arc::downgrade(&cache),
            urls: urls.clone(),
            notifier: notifier.clone(),
        }));

        Ok(Self {
            config,
            cluster: TracedCluster::new(cluster),
            allocator: TracedAllocator::new(allocator),
            cache,
            urls,
            notifier,
            locks: WorkspaceLocks::new(),
            builder: Box::new(DefinitePodBuilder),
        })
    }

    /// Replace how start requests become compute units.
    pub fn with_start_context_builder(
        mut self,
        builder: impl StartContextBuilder + 'static,
    ) -> Self {
        self.builder = Box::new(builder);
        self
    }

    /// Start synchronizing the cache; runs until `stop` turns `true`.
    pub fn run(&self, stop: watch::Receiver<bool>) -> JoinHandle<()> {
        tracing::info!(
            namespace = %self.config.namespace,
            allocator = self.allocator.is_enabled(),
            "starting workspace manager"
        );
        self.cache.run(self.cluster.clone(), stop)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ClusterStateCache> {
        &self.cache
    }

    /// Receive status updates from now on.
    pub fn subscribe(&self) -> StatusSubscription {
        self.notifier.subscribe()
    }

    /// Statuses of all workspaces matching the request's filter.
    pub async fn get_workspaces(
        &self,
        req: &GetWorkspacesRequest,
    ) -> Result<Vec<WorkspaceStatus>, ManagerError> {
        self.cache
            .wait_for_sync(self.config.operation_timeout())
            .await?;
        Ok(status::get_workspaces(
            &self.cache.snapshot(),
            req,
            &self.urls,
        ))
    }

    pub async fn describe_workspace(
        &self,
        id: &WorkspaceId,
    ) -> Result<WorkspaceStatus, ManagerError> {
        self.cache
            .wait_for_sync(self.config.operation_timeout())
            .await?;
        compute_status(&self.cache.snapshot(), id, &self.urls)
    }

    /// The single live compute unit of a workspace.
    pub async fn find_workspace_pod(&self, id: &WorkspaceId) -> Result<ComputeUnit, ManagerError> {
        locate::find_workspace_pod(&self.cache, id, self.config.operation_timeout()).await
    }

    pub fn validate_start_request(&self, req: &StartWorkspaceRequest) -> Result<(), ManagerError> {
        validate::validate_start_request(req)
    }

    pub async fn control_port(
        &self,
        req: &ControlPortRequest,
    ) -> Result<ControlPortResponse, ManagerError> {
        let controller = PortController {
            cluster: &self.cluster,
            allocator: &self.allocator,
            cache: &self.cache,
            urls: &self.urls,
            notifier: &self.notifier,
            locks: &self.locks,
        };
        let result = controller
            .control_port(req, deadline_in(self.config.operation_timeout()))
            .await;
        if let Err(e) = &result {
            tracing::warn!(
                workspace_id = %req.id,
                port = req.spec.port,
                expose = req.expose,
                error = %e,
                "control port failed"
            );
        }
        result
    }

    /// Create the compute unit of a validated request.
    ///
    /// A workspace that still has a live unit cannot be started again.
    pub async fn start_workspace(
        &self,
        req: &StartWorkspaceRequest,
    ) -> Result<StartWorkspaceResponse, ManagerError> {
        validate::validate_start_request(req)?;
        let deadline = deadline_in(self.config.operation_timeout());
        let _guard = within(
            deadline,
            "waiting for other start",
            self.locks.lock(&req.id),
        )
        .await?;
        self.cache.wait_for_sync(remaining(deadline)).await?;
        if self
            .cache
            .get_pods(&req.id)
            .iter()
            .any(|u| !u.is_terminated())
        {
            return Err(already_exists(&req.id));
        }

        let context = self.builder.build(self.cache.namespace(), req)?;
        let create = self.cluster.create(context.unit.into());
        match within(deadline, "creating compute unit", create).await? {
            Ok(object) => {
                tracing::info!(
                    workspace_id = %req.id,
                    unit = object.name(),
                    workspace_type = %req.workspace_type,
                    "workspace started"
                );
                Ok(StartWorkspaceResponse {
                    unit_name: object.name().to_string(),
                })
            }
            Err(ClusterError::AlreadyExists { .. }) => Err(already_exists(&req.id)),
            Err(e) => Err(e.into()),
        }
    }
}

fn already_exists(id: &WorkspaceId) -> ManagerError {
    ManagerError::Validation(format!("workspace {} already exists", id))
}

/// Publishes the recomputed status of a workspace whenever the cache
/// observes a change to one of its objects.
struct StatusForwarder {
    cache: Weak<ClusterStateCache>,
    urls: PortUrls,
    notifier: StatusBroadcaster,
}

impl StatusForwarder {
    fn forward(&self, object: &ClusterObject) {
        let Some(id) = object.meta().workspace_id() else {
            return;
        };
        let Some(cache) = self.cache.upgrade() else {
            return;
        };
        // Initial list replays every object; subscribers only see changes
        if !cache.has_synced() {
            return;
        }
        match compute_status(&cache.snapshot(), &id, &self.urls) {
            Ok(status) => {
                self.notifier.publish(status);
            }
            Err(ManagerError::NotFound(_)) => {
                if let ClusterObject::Pod(unit) = object {
                    let gone = ComputeUnit {
                        phase: UnitPhase::Stopped,
                        ..unit.clone()
                    };
                    self.notifier
                        .publish(project_status(&gone, None, None, &self.urls));
                }
            }
            Err(e) => {
                tracing::debug!(workspace_id = %id, error = %e, "no status to forward");
            }
        }
    }
}

impl ResourceEventHandler for StatusForwarder {
    fn on_add(&self, object: &ClusterObject) {
        self.forward(object);
    }

    fn on_update(&self, _old: &ClusterObject, new: &ClusterObject) {
        self.forward(new);
    }

    fn on_delete(&self, object: &ClusterObject) {
        self.forward(object);
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
