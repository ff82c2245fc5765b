//! Workspace status specs
//!
//! Verify the statuses listed by the manager follow the cluster.

use crate::prelude::*;

fn ids(statuses: &[WorkspaceStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.id.to_string()).collect()
}

#[tokio::test]
async fn lists_every_workspace_in_identity_order() {
    let ws = workspaces(vec![
        unit("charlie", WorkspaceType::Regular).into(),
        unit("alpha", WorkspaceType::Prebuild).into(),
        unit("bravo", WorkspaceType::Regular).into(),
    ])
    .await;

    let all = ws
        .manager
        .get_workspaces(&GetWorkspacesRequest::default())
        .await
        .unwrap();
    assert_eq!(ids(&all), vec!["alpha", "bravo", "charlie"]);
    assert_eq!(all[0].workspace_type, WorkspaceType::Prebuild);
    assert_eq!(all[0].unit_name, "prebuild-alpha");
}

#[tokio::test]
async fn filters_by_metadata() {
    let mut theirs = unit("bravo", WorkspaceType::Regular);
    theirs
        .meta
        .labels
        .insert(OWNER_LABEL.to_string(), "someone-else".to_string());
    let ws = workspaces(vec![
        unit("alpha", WorkspaceType::Regular).into(),
        theirs.into(),
    ])
    .await;

    let by_owner = ws
        .manager
        .get_workspaces(&GetWorkspacesRequest {
            owner: Some(OwnerId::new("someone-else")),
            meta_id: None,
        })
        .await
        .unwrap();
    assert_eq!(ids(&by_owner), vec!["bravo"]);

    let by_meta = ws
        .manager
        .get_workspaces(&GetWorkspacesRequest {
            owner: None,
            meta_id: Some(MetaId::new("meta-alpha")),
        })
        .await
        .unwrap();
    assert_eq!(ids(&by_meta), vec!["alpha"]);
}

#[tokio::test]
async fn ambiguous_workspace_is_left_out() {
    let ws = workspaces(vec![
        unit("alpha", WorkspaceType::Regular).into(),
        unit("foobar", WorkspaceType::Prebuild).into(),
        unit("foobar", WorkspaceType::Regular).into(),
    ])
    .await;

    let all = ws
        .manager
        .get_workspaces(&GetWorkspacesRequest::default())
        .await
        .unwrap();
    assert_eq!(ids(&all), vec!["alpha"]);
}

#[tokio::test]
async fn phases_follow_lifecycle_records() {
    let ws = workspaces(vec![
        unit("running", WorkspaceType::Regular).into(),
        unit("stopping", WorkspaceType::Regular).into(),
        lifecycle_record("stopping", &[(STOPPING_SINCE_KEY, "1700000000000")]).into(),
        unit_in_phase("backed-up", WorkspaceType::Regular, UnitPhase::Terminating).into(),
        lifecycle_record("backed-up", &[(FINAL_BACKUP_COMPLETE_KEY, "true")]).into(),
        unit_in_phase("pending", WorkspaceType::Regular, UnitPhase::Pending).into(),
    ])
    .await;

    let all = ws
        .manager
        .get_workspaces(&GetWorkspacesRequest::default())
        .await
        .unwrap();
    let phases: Vec<_> = all.iter().map(|s| (s.id.to_string(), s.phase)).collect();
    similar_asserts::assert_eq!(
        phases,
        vec![
            ("backed-up".to_string(), WorkspacePhase::Stopped),
            ("pending".to_string(), WorkspacePhase::Pending),
            ("running".to_string(), WorkspacePhase::Running),
            ("stopping".to_string(), WorkspacePhase::Stopping),
        ]
    );
}

#[tokio::test]
async fn deleted_workspace_disappears() {
    let ws = workspaces(vec![
        unit("alpha", WorkspaceType::Regular).into(),
        unit("bravo", WorkspaceType::Regular).into(),
    ])
    .await;

    assert!(ws
        .cluster
        .remove(TEST_NAMESPACE, ObjectKind::Pod, "ws-bravo"));

    let ws = &ws;
    let gone = wait_for(SPEC_WAIT_MAX_MS, || async move {
        ws.manager
            .get_workspaces(&GetWorkspacesRequest::default())
            .await
            .is_ok_and(|all| all.len() == 1)
    })
    .await;
    assert!(gone, "deleted workspace still listed");
}
