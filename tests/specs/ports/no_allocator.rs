//! No-allocator mode specs
//!
//! Without an ingress allocator public ports are refused outright.

use crate::prelude::*;

#[tokio::test]
async fn public_port_is_unsupported() {
    let ws = workspaces_with(
        vec![unit("foobar", WorkspaceType::Regular).into()],
        NoOpIngressPortAllocator,
    )
    .await;

    let err = ws.expose("foobar", public_port(8080)).await.unwrap_err();
    assert!(matches!(err, ManagerError::Unsupported(_)), "{err:?}");
    assert!(ws.cluster.writes().is_empty());
}

#[tokio::test]
async fn private_port_succeeds_without_url() {
    let ws = workspaces_with(
        vec![unit("foobar", WorkspaceType::Regular).into()],
        NoOpIngressPortAllocator,
    )
    .await;

    let resp = ws.expose("foobar", private_port(3000)).await.unwrap();
    assert_eq!(
        resp,
        ControlPortResponse {
            port: 3000,
            url: None
        }
    );
    assert_eq!(ws.ports_service("foobar").unwrap().ports.len(), 1);
}

#[tokio::test]
async fn private_port_makes_no_allocator_call() {
    let ws = workspaces(vec![unit("foobar", WorkspaceType::Regular).into()]).await;

    ws.expose("foobar", private_port(3000)).await.unwrap();
    ws.unexpose("foobar", private_port(3000)).await.unwrap();
    assert_eq!(ws.allocator.calls(), Vec::<AllocatorCall>::new());
}
