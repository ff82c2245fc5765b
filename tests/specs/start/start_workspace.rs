//! Start request specs
//!
//! Verify validation of start requests and creation of compute units.

use crate::prelude::*;

#[tokio::test]
async fn empty_identity_is_rejected() {
    let ws = workspaces(Vec::new()).await;
    let mut req = start_request("foobar", WorkspaceType::Regular);
    req.id = WorkspaceId::default();

    let err = ws.manager.validate_start_request(&req).unwrap_err();
    assert_eq!(err.to_string(), "invalid request: missing workspace id");
}

#[tokio::test]
async fn recognized_type_with_identity_is_accepted() {
    let ws = workspaces(Vec::new()).await;
    for ty in [
        WorkspaceType::Regular,
        WorkspaceType::Prebuild,
        WorkspaceType::Probe,
        WorkspaceType::Ghost,
    ] {
        let req = start_request("foobar", ty);
        assert_eq!(ws.manager.validate_start_request(&req), Ok(()), "{ty}");
    }
}

#[test]
fn unrecognized_type_does_not_decode() {
    let json = r#"{"id": "foobar", "type": "SNAPSHOT"}"#;
    assert!(serde_json::from_str::<StartWorkspaceRequest>(json).is_err());
}

#[tokio::test]
async fn started_workspace_becomes_locatable() {
    let ws = workspaces(Vec::new()).await;

    let resp = ws
        .manager
        .start_workspace(&start_request("foobar", WorkspaceType::Prebuild))
        .await
        .unwrap();
    assert_eq!(resp.unit_name, "prebuild-foobar");

    let ws = &ws;
    let located = wait_for(SPEC_WAIT_MAX_MS, || async move {
        ws.manager
            .find_workspace_pod(&WorkspaceId::new("foobar"))
            .await
            .is_ok_and(|u| u.name() == "prebuild-foobar")
    })
    .await;
    assert!(located, "started unit never became visible");
}

#[tokio::test]
async fn starting_a_running_workspace_is_rejected() {
    let ws = workspaces(vec![unit("foobar", WorkspaceType::Regular).into()]).await;

    let err = ws
        .manager
        .start_workspace(&start_request("foobar", WorkspaceType::Regular))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid request: workspace foobar already exists"
    );
    assert!(ws.cluster.writes().is_empty());
}
