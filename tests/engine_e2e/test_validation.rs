//! E2E tests: validation and reference checks.

use std::sync::Arc;

use testtrack_lib::db::catalog;
use testtrack_lib::db::projects;
use testtrack_lib::error::AppError;
use testtrack_lib::models::{TestType, UpdateTestCaseRequest};
use uuid::Uuid;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_both_type_fields_rejected() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let custom = catalog::insert_custom_test_type(pool.connection(), fixture.organization.id, "Smoke")
        .await
        .unwrap();
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let mut req = create_request(&fixture, "Ambiguous");
    req.custom_test_type_id = Some(custom.id);
    assert!(matches!(engine.create(req).await, Err(AppError::InvalidInput(_))));
}

#[actix_rt::test]
async fn test_custom_type_replaces_builtin_on_update() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let custom = catalog::insert_custom_test_type(pool.connection(), fixture.organization.id, "Exploratory")
        .await
        .unwrap();
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let tc = engine.create(create_request(&fixture, "Typed")).await.unwrap();
    assert_eq!(tc.test_type, Some(TestType::Functional));

    let updated = engine
        .update(
            tc.id,
            UpdateTestCaseRequest {
                custom_test_type_id: Some(custom.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.test_type, None);
    assert_eq!(updated.custom_test_type_id, Some(custom.id));
}

#[actix_rt::test]
async fn test_missing_references_are_not_found() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let mut missing_project = create_request(&fixture, "Orphan");
    missing_project.project_id = Uuid::now_v7();
    assert!(matches!(engine.create(missing_project).await, Err(AppError::NotFound(_))));

    let mut missing_user = create_request(&fixture, "Nobody");
    missing_user.responsible_id = Some(Uuid::now_v7());
    assert!(matches!(engine.create(missing_user).await, Err(AppError::NotFound(_))));

    let mut missing_type = create_request(&fixture, "Untyped");
    missing_type.test_type = None;
    missing_type.custom_test_type_id = Some(Uuid::now_v7());
    assert!(matches!(engine.create(missing_type).await, Err(AppError::NotFound(_))));

    assert!(matches!(engine.get(Uuid::now_v7()).await, Err(AppError::NotFound(_))));
    assert!(matches!(engine.delete(Uuid::now_v7()).await, Err(AppError::NotFound(_))));
}

#[actix_rt::test]
async fn test_scenario_must_belong_to_project() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let other = projects::insert_project(pool.connection(), fixture.organization.id, "Other")
        .await
        .unwrap();
    let foreign = catalog::insert_test_scenario(pool.connection(), other.id, "Foreign flow")
        .await
        .unwrap();
    let own = catalog::insert_test_scenario(pool.connection(), fixture.project.id, "Happy path")
        .await
        .unwrap();
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let mut req = create_request(&fixture, "Scenario");
    req.test_scenario_id = Some(foreign.id);
    assert!(matches!(engine.create(req).await, Err(AppError::InvalidInput(_))));

    let mut req = create_request(&fixture, "Scenario");
    req.test_scenario_id = Some(own.id);
    let tc = engine.create(req).await.unwrap();
    assert_eq!(tc.test_scenario_id, Some(own.id));
}

#[actix_rt::test]
async fn test_patch_keeps_unspecified_fields() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let mut req = create_request(&fixture, "Stable");
    req.responsible_id = Some(fixture.assignee.id);
    req.estimated_time = Some("30m".to_string());
    req.attachments = vec!["screen.png".to_string()];
    let tc = engine.create(req).await.unwrap();

    let updated = engine
        .update(
            tc.id,
            UpdateTestCaseRequest {
                title: Some("Stable title".to_string()),
                estimated_time: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Stable title");
    assert_eq!(updated.estimated_time, None);
    assert_eq!(updated.responsible_id, Some(fixture.assignee.id));
    assert_eq!(updated.description, tc.description);
    assert_eq!(updated.attachments, vec!["screen.png".to_string()]);
    assert_eq!(updated.project_sequence_id, tc.project_sequence_id);
    assert_eq!(updated.created_by_id, tc.created_by_id);
}
