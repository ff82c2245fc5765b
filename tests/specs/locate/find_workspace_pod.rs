//! Workspace locator specs
//!
//! Verify identity lookup is type-agnostic and never resolves ambiguity.

use crate::prelude::*;

#[tokio::test]
async fn prebuild_unit_is_found_by_identity() {
    let ws = workspaces(vec![unit("foobar", WorkspaceType::Prebuild).into()]).await;

    let found = ws
        .manager
        .find_workspace_pod(&WorkspaceId::new("foobar"))
        .await
        .unwrap();
    assert_eq!(found.name(), "prebuild-foobar");
}

#[tokio::test]
async fn regular_unit_is_found_by_identity() {
    let ws = workspaces(vec![
        unit("foobar", WorkspaceType::Regular).into(),
        unit("other", WorkspaceType::Regular).into(),
    ])
    .await;

    let found = ws
        .manager
        .find_workspace_pod(&WorkspaceId::new("foobar"))
        .await
        .unwrap();
    assert_eq!(found.name(), "ws-foobar");
}

#[tokio::test]
async fn two_candidates_is_an_error() {
    let ws = workspaces(vec![
        unit("foobar", WorkspaceType::Prebuild).into(),
        unit("foobar", WorkspaceType::Regular).into(),
    ])
    .await;

    let err = ws
        .manager
        .find_workspace_pod(&WorkspaceId::new("foobar"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "found 2 candidates for workspace foobar");
}

#[tokio::test]
async fn unknown_identity_is_not_found() {
    let ws = workspaces(vec![unit("other", WorkspaceType::Regular).into()]).await;

    let err = ws
        .manager
        .find_workspace_pod(&WorkspaceId::new("foobar"))
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn stopped_units_are_not_candidates() {
    let ws = workspaces(vec![
        unit_in_phase("foobar", WorkspaceType::Prebuild, UnitPhase::Stopped).into(),
        unit("foobar", WorkspaceType::Regular).into(),
    ])
    .await;

    let found = ws
        .manager
        .find_workspace_pod(&WorkspaceId::new("foobar"))
        .await
        .unwrap();
    assert_eq!(found.name(), "ws-foobar");
}

#[tokio::test]
async fn unit_created_after_sync_is_found() {
    let ws = workspaces(Vec::new()).await;
    ws.cluster.apply(unit("foobar", WorkspaceType::Regular));

    let ws = &ws;
    let found = wait_for(SPEC_WAIT_MAX_MS, || async move {
        ws.manager
            .find_workspace_pod(&WorkspaceId::new("foobar"))
            .await
            .is_ok()
    })
    .await;
    assert!(found, "unit never became visible");
}
