//! E2E tests: project-scoped sequence allocation.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use testtrack_lib::db::{catalog, projects};
use testtrack_lib::error::AppError;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_first_allocations_are_one_then_two() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let first = engine.create(create_request(&fixture, "Login")).await.unwrap();
    let second = engine.create(create_request(&fixture, "Logout")).await.unwrap();

    assert_eq!(first.project_sequence_id, 1);
    assert_eq!(first.display_key, "TT-1");
    assert_eq!(second.project_sequence_id, 2);
    assert_eq!(second.display_key, "TT-2");
}

#[actix_rt::test]
async fn test_concurrent_creations_get_distinct_numbers() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let creations = (0..8).map(|i| engine.create(create_request(&fixture, &format!("Case {}", i))));
    let results = join_all(creations).await;

    let numbers: BTreeSet<i32> = results
        .into_iter()
        .map(|r| r.expect("creation should succeed").project_sequence_id)
        .collect();
    assert_eq!(numbers, (1..=8).collect::<BTreeSet<i32>>());

    let project = projects::find_project(pool.connection(), fixture.project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(project.test_case_sequence, 8);
}

#[actix_rt::test]
async fn test_projects_number_independently() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let other = projects::insert_project(pool.connection(), fixture.organization.id, "Mobile App")
        .await
        .unwrap();
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    engine.create(create_request(&fixture, "A")).await.unwrap();
    let mut req = create_request(&fixture, "B");
    req.project_id = other.id;
    let in_other = engine.create(req).await.unwrap();

    assert_eq!(in_other.project_sequence_id, 1);
    assert_eq!(in_other.display_key, "MA-1");
}

#[actix_rt::test]
async fn test_deleted_numbers_are_not_reused() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let first = engine.create(create_request(&fixture, "First")).await.unwrap();
    engine.delete(first.id).await.unwrap();
    let next = engine.create(create_request(&fixture, "Second")).await.unwrap();

    assert_eq!(next.project_sequence_id, 2);
}

#[actix_rt::test]
async fn test_failed_creation_does_not_consume_a_number() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let foreign_org = catalog::insert_organization(pool.connection(), "foreign").await.unwrap();
    let foreign_type = catalog::insert_custom_test_type(pool.connection(), foreign_org.id, "Smoke")
        .await
        .unwrap();
    let engine = recording_engine(&pool, Arc::default(), Arc::default());

    let mut bad = create_request(&fixture, "Rejected");
    bad.test_type = None;
    bad.custom_test_type_id = Some(foreign_type.id);
    assert!(engine.create(bad).await.is_err());

    let created = engine.create(create_request(&fixture, "Accepted")).await.unwrap();
    assert_eq!(created.project_sequence_id, 1);
}

#[actix_rt::test]
async fn test_lock_wait_past_timeout_is_conflict() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let engine = impatient_engine(&pool, Duration::from_millis(100));

    // Another allocation holds the project row until it rolls back.
    let holder = pool.begin().await.unwrap();
    projects::lock_and_increment_counter(&holder, fixture.project.id, Duration::from_secs(5))
        .await
        .unwrap();

    let result = engine.create(create_request(&fixture, "Blocked")).await;
    assert!(matches!(result, Err(AppError::Conflict(_))), "got {:?}", result);

    holder.rollback().await.unwrap();

    let project = projects::find_project(pool.connection(), fixture.project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(project.test_case_sequence, 0);

    let created = engine.create(create_request(&fixture, "Retried")).await.unwrap();
    assert_eq!(created.project_sequence_id, 1);
}
