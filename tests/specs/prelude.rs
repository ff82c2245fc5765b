//! Test helpers for behavioral specifications.
//!
//! Every spec runs a real `Manager` (cache, reflector, port controller)
//! against a `FakeCluster`. Nothing is shared between tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

pub use wsman_adapters::{
    AllocatorCall, ClusterCall, FakeCluster, FakeIngressPortAllocator, IngressPortAllocator,
    NoOpIngressPortAllocator,
};
pub use wsman_core::naming::{FINAL_BACKUP_COMPLETE_KEY, OWNER_LABEL, STOPPING_SINCE_KEY};
pub use wsman_core::test_support::{
    lifecycle_record, ports_service, private_port, public_port, service_prefix, unit,
    unit_in_phase, TEST_NAMESPACE,
};
pub use wsman_core::{
    ClusterObject, ControlPortRequest, ControlPortResponse, GetWorkspacesRequest, Initializer,
    MetaId, ObjectKind, OwnerId, PortSpec, PortsService, StartMetadata, StartWorkspaceRequest,
    StartWorkspaceSpec, UnitPhase, WorkspaceId, WorkspacePhase, WorkspaceStatus, WorkspaceType,
};
pub use wsman_manager::{Config, Manager, ManagerError};

// Spec polling timeouts
pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

const SPEC_OPERATION_TIMEOUT_MS: u64 = 2000;

/// Surface manager logs with `RUST_LOG=wsman_manager=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn spec_config() -> Config {
    Config {
        namespace: TEST_NAMESPACE.to_string(),
        ingress_host: "ws.example.com".to_string(),
        workspace_port_url_template: Some("https://{{ .Host }}:{{ .IngressPort }}".to_string()),
        operation_timeout_ms: SPEC_OPERATION_TIMEOUT_MS,
        ..Config::default()
    }
}

// =============================================================================
// Workspaces
// =============================================================================

/// A running manager over an in-memory cluster.
pub struct Workspaces<A> {
    pub manager: Manager<FakeCluster, A>,
    pub cluster: FakeCluster,
    pub allocator: A,
    _stop: watch::Sender<bool>,
}

/// Manager with an ingress allocator, synced over `objects`.
pub async fn workspaces(
    objects: Vec<ClusterObject>,
) -> Workspaces<FakeIngressPortAllocator> {
    workspaces_with(objects, FakeIngressPortAllocator::new()).await
}

pub async fn workspaces_with<A: IngressPortAllocator>(
    objects: Vec<ClusterObject>,
    allocator: A,
) -> Workspaces<A> {
    init_tracing();
    let cluster = FakeCluster::with_objects(objects);
    let manager = Manager::new(spec_config(), cluster.clone(), allocator.clone()).unwrap();
    let (stop, stop_rx) = watch::channel(false);
    let _task = manager.run(stop_rx);
    manager
        .cache()
        .wait_for_sync(Duration::from_millis(SPEC_WAIT_MAX_MS))
        .await
        .unwrap();
    Workspaces {
        manager,
        cluster,
        allocator,
        _stop: stop,
    }
}

impl<A: IngressPortAllocator> Workspaces<A> {
    pub async fn expose(
        &self,
        id: &str,
        spec: PortSpec,
    ) -> Result<ControlPortResponse, ManagerError> {
        self.control(id, true, spec).await
    }

    pub async fn unexpose(
        &self,
        id: &str,
        spec: PortSpec,
    ) -> Result<ControlPortResponse, ManagerError> {
        self.control(id, false, spec).await
    }

    async fn control(
        &self,
        id: &str,
        expose: bool,
        spec: PortSpec,
    ) -> Result<ControlPortResponse, ManagerError> {
        self.manager
            .control_port(&ControlPortRequest {
                id: WorkspaceId::new(id),
                expose,
                spec,
            })
            .await
    }

    /// The ports service of `id` as stored in the cluster.
    pub fn ports_service(&self, id: &str) -> Option<PortsService> {
        let name = wsman_core::naming::ports_service_name(&service_prefix(id));
        match self.cluster.object(TEST_NAMESPACE, ObjectKind::Service, &name) {
            Some(ClusterObject::Service(service)) => Some(service),
            _ => None,
        }
    }

    pub async fn status(&self, id: &str) -> Result<WorkspaceStatus, ManagerError> {
        self.manager
            .describe_workspace(&WorkspaceId::new(id))
            .await
    }

    /// Poll the manager's cached view until `condition` holds.
    pub async fn wait_for_status<F>(&self, id: &str, mut condition: F) -> bool
    where
        F: FnMut(&WorkspaceStatus) -> bool,
    {
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SPEC_WAIT_MAX_MS);
        while start.elapsed() < timeout {
            if self.status(id).await.is_ok_and(|s| condition(&s)) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(SPEC_POLL_INTERVAL_MS)).await;
        }
        false
    }
}

/// Poll `condition` every [`SPEC_POLL_INTERVAL_MS`] until it holds or the
/// timeout passes. Returns whether it held.
pub async fn wait_for<F, Fut>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll_interval = Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition().await {
            return true;
        }
        tokio::time::sleep(poll_interval).await;
    }
    false
}

// =============================================================================
// Requests
// =============================================================================

pub fn start_request(id: &str, ty: WorkspaceType) -> StartWorkspaceRequest {
    StartWorkspaceRequest {
        id: WorkspaceId::new(id),
        service_prefix: service_prefix(id),
        metadata: StartMetadata {
            owner: OwnerId::new("tester"),
            meta_id: MetaId::new(format!("meta-{}", id)),
        },
        spec: StartWorkspaceSpec {
            image: "eu.gcr.io/workspace-images:latest".to_string(),
            workspace_location: "/workspace".to_string(),
            initializer: Some(Initializer::Empty),
            ports: vec![private_port(3000)],
        },
        workspace_type: ty,
    }
}
