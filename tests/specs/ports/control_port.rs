//! Port control specs
//!
//! Verify expose/unexpose against the cluster's ports service and the
//! status the manager reports afterwards.

use crate::prelude::*;

fn exposed(service: &PortsService) -> Vec<(u32, u32, String)> {
    service
        .ports
        .iter()
        .map(|p| (p.port, p.target_port, p.name.clone()))
        .collect()
}

#[tokio::test]
async fn expose_public_port_reports_url() {
    let ws = workspaces(vec![unit("foobar", WorkspaceType::Regular).into()]).await;

    let resp = ws.expose("foobar", public_port(8080)).await.unwrap();
    assert_eq!(resp.port, 8080);
    assert_eq!(resp.url.as_deref(), Some("https://ws.example.com:10000"));
}

#[tokio::test]
async fn exposing_twice_is_idempotent() {
    let ws = workspaces(vec![unit("foobar", WorkspaceType::Regular).into()]).await;

    let first = ws.expose("foobar", public_port(8080)).await.unwrap();
    let after_first = ws.ports_service("foobar").unwrap();
    let second = ws.expose("foobar", public_port(8080)).await.unwrap();
    let after_second = ws.ports_service("foobar").unwrap();

    assert_eq!(first, second);
    assert_eq!(exposed(&after_first), exposed(&after_second));
    assert_eq!(after_first.meta.annotations, after_second.meta.annotations);
    assert_eq!(after_second.ports.len(), 1);
}

#[tokio::test]
async fn expose_then_unexpose_removes_the_service() {
    let ws = workspaces(vec![unit("foobar", WorkspaceType::Regular).into()]).await;

    ws.expose("foobar", public_port(8080)).await.unwrap();
    assert!(ws.ports_service("foobar").is_some());

    let resp = ws.unexpose("foobar", public_port(8080)).await.unwrap();
    assert_eq!(resp.url, None);
    assert!(ws.ports_service("foobar").is_none());
    assert!(ws.allocator.assignments().is_empty());

    let settled = ws
        .wait_for_status("foobar", |s| s.exposed_ports.is_empty())
        .await;
    assert!(settled, "status still lists the port");
}

#[tokio::test]
async fn unexpose_keeps_other_ports() {
    let ws = workspaces(vec![unit("foobar", WorkspaceType::Regular).into()]).await;

    ws.expose("foobar", private_port(3000)).await.unwrap();
    ws.expose("foobar", public_port(8080)).await.unwrap();
    ws.unexpose("foobar", public_port(8080)).await.unwrap();

    let service = ws.ports_service("foobar").unwrap();
    similar_asserts::assert_eq!(
        exposed(&service),
        vec![(3000, 3000, "p3000-private".to_string())]
    );
}

#[tokio::test]
async fn status_catches_up_with_exposed_ports() {
    let ws = workspaces(vec![unit("foobar", WorkspaceType::Regular).into()]).await;

    ws.expose("foobar", public_port(8080)).await.unwrap();
    ws.expose("foobar", private_port(3000)).await.unwrap();

    let settled = ws
        .wait_for_status("foobar", |s| s.exposed_ports.len() == 2)
        .await;
    assert!(settled, "status never listed both ports");

    let status = ws.status("foobar").await.unwrap();
    let ports: Vec<_> = status
        .exposed_ports
        .iter()
        .map(|p| (p.port, p.url.clone()))
        .collect();
    similar_asserts::assert_eq!(
        ports,
        vec![
            (3000, None),
            (8080, Some("https://ws.example.com:10000".to_string())),
        ]
    );
}

#[tokio::test]
async fn subscribers_are_told_about_exposed_ports() {
    let ws = workspaces(vec![unit("foobar", WorkspaceType::Regular).into()]).await;
    let mut updates = ws.manager.subscribe();

    ws.expose("foobar", public_port(8080)).await.unwrap();

    let status = tokio::time::timeout(
        std::time::Duration::from_millis(SPEC_WAIT_MAX_MS),
        updates.recv(),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(status.id, "foobar");
    assert_eq!(status.exposed_ports.len(), 1);
}

#[tokio::test]
async fn port_of_unknown_workspace_is_not_found() {
    let ws = workspaces(Vec::new()).await;

    let err = ws.expose("foobar", public_port(8080)).await.unwrap_err();
    assert_eq!(err.to_string(), "workspace foobar not found");
    assert!(ws.cluster.writes().is_empty());
    assert!(ws.allocator.calls().is_empty());
}

#[tokio::test]
async fn concurrent_exposes_keep_the_shared_listener() {
    let ws = workspaces(vec![unit("foobar", WorkspaceType::Regular).into()]).await;
    ws.allocator.set_delay(std::time::Duration::from_millis(50));

    let (a, b) = tokio::join!(
        ws.expose("foobar", public_port(8080)),
        ws.expose("foobar", public_port(8080)),
    );
    assert_eq!(a.unwrap(), b.unwrap());

    let service = ws.ports_service("foobar").unwrap();
    assert_eq!(service.ingress_ports().get(&8080), Some(&10000));
    assert_eq!(ws.allocator.assignments().len(), 1);
    assert!(!ws
        .allocator
        .calls()
        .iter()
        .any(|c| matches!(c, AllocatorCall::Release { .. })));
}
