//! E2E tests: script versioning and status snapshots.

use std::sync::Arc;

use testtrack_lib::error::AppError;
use testtrack_lib::models::{AddScriptRequest, TestCaseStatus, UpdateTestCaseRequest};
use uuid::Uuid;

use super::test_helpers::*;

fn paths(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("scripts/login_v{}.spec.ts", i)).collect()
}

#[actix_rt::test]
async fn test_initial_scripts_are_versioned_in_order() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let mut req = create_request(&fixture, "Login");
    req.scripts = paths(3);
    let tc = engine.create(req).await.unwrap();

    let versions: Vec<i32> = tc.scripts.iter().map(|s| s.version).collect();
    assert_eq!(versions, vec![1, 2, 3]);
    assert_eq!(tc.scripts[0].script_path, "scripts/login_v1.spec.ts");
    assert_eq!(tc.scripts[2].script_path, "scripts/login_v3.spec.ts");
    assert!(tc.scripts.iter().all(|s| s.status == TestCaseStatus::Pending));
}

#[actix_rt::test]
async fn test_added_script_takes_current_status() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let mut req = create_request(&fixture, "Search");
    req.status = Some(TestCaseStatus::InProgress);
    let tc = engine.create(req).await.unwrap();

    let tc = engine
        .add_script(
            tc.id,
            AddScriptRequest {
                script_path: "scripts/search.spec.ts".to_string(),
            },
        )
        .await
        .unwrap();

    let latest = tc.latest_script().unwrap();
    assert_eq!(latest.version, 1);
    assert_eq!(latest.status, TestCaseStatus::InProgress);
}

#[actix_rt::test]
async fn test_status_change_resyncs_only_latest_version() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let mut req = create_request(&fixture, "Checkout");
    req.scripts = paths(2);
    let tc = engine.create(req).await.unwrap();

    let updated = engine
        .update(
            tc.id,
            UpdateTestCaseRequest {
                status: Some(TestCaseStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.scripts[0].status, TestCaseStatus::Pending);
    assert_eq!(updated.scripts[1].status, TestCaseStatus::Approved);
    assert!(updated.scripts[1].status_set_at >= tc.scripts[1].status_set_at);
}

#[actix_rt::test]
async fn test_update_with_new_scripts_resyncs_then_appends() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let mut req = create_request(&fixture, "Cart");
    req.scripts = paths(1);
    let tc = engine.create(req).await.unwrap();

    let updated = engine
        .update(
            tc.id,
            UpdateTestCaseRequest {
                status: Some(TestCaseStatus::Blocked),
                scripts: vec!["scripts/cart_v2.spec.ts".to_string()],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let summary: Vec<(i32, TestCaseStatus)> =
        updated.scripts.iter().map(|s| (s.version, s.status)).collect();
    assert_eq!(
        summary,
        vec![(1, TestCaseStatus::Blocked), (2, TestCaseStatus::Blocked)]
    );
}

#[actix_rt::test]
async fn test_unchanged_status_leaves_snapshot_alone() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let mut req = create_request(&fixture, "Profile");
    req.scripts = paths(1);
    let tc = engine.create(req).await.unwrap();

    let updated = engine
        .update(
            tc.id,
            UpdateTestCaseRequest {
                status: Some(TestCaseStatus::Pending),
                title: Some("Profile page".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Profile page");
    assert_eq!(updated.scripts[0].status_set_at, tc.scripts[0].status_set_at);
}

#[actix_rt::test]
async fn test_versions_have_no_gaps_across_operations() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let mut req = create_request(&fixture, "Settings");
    req.scripts = paths(2);
    let tc = engine.create(req).await.unwrap();

    engine
        .add_script(tc.id, AddScriptRequest { script_path: "a.js".to_string() })
        .await
        .unwrap();
    engine
        .update(
            tc.id,
            UpdateTestCaseRequest {
                scripts: vec!["b.js".to_string(), "c.js".to_string()],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let versions: Vec<i32> = engine
        .list_scripts(tc.id)
        .await
        .unwrap()
        .iter()
        .map(|s| s.version)
        .collect();
    assert_eq!(versions, vec![1, 2, 3, 4, 5]);
}

#[actix_rt::test]
async fn test_add_script_to_missing_test_case() {
    let Some(pool) = create_test_pool().await else { return };
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let result = engine
        .add_script(Uuid::now_v7(), AddScriptRequest { script_path: "x.js".to_string() })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
