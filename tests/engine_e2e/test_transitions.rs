//! E2E tests: status transitions and their side effects.

use std::sync::Arc;

use testtrack_lib::models::{NotificationKind, TestCaseStatus, UpdateTestCaseRequest};

use super::test_helpers::*;

#[actix_rt::test]
async fn test_create_reproved_files_one_bug_and_notifies_creator() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let filer = Arc::new(RecordingBugFiler::default());
    let engine = recording_engine(&pool, notifier.clone(), filer.clone());

    let mut req = create_request(&fixture, "Payment declined");
    req.status = Some(TestCaseStatus::Reproved);
    req.bug_responsible_id = Some(fixture.developer.id);
    let tc = engine.create(req).await.unwrap();

    let bugs = filer.filed();
    assert_eq!(bugs.len(), 1);
    assert_eq!(bugs[0].title, "TT-1 Payment declined");
    assert_eq!(bugs[0].assigned_developer_id, fixture.developer.id);
    assert_eq!(bugs[0].test_case_id, tc.id);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id, fixture.creator.id);
    assert_eq!(sent[0].kind, NotificationKind::TestCaseFailed);
}

#[actix_rt::test]
async fn test_failure_notifies_every_member_once() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    add_member(&pool, &fixture).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let filer = Arc::new(RecordingBugFiler::default());
    let engine = recording_engine(&pool, notifier.clone(), filer.clone());

    let tc = engine.create(create_request(&fixture, "Export")).await.unwrap();
    engine
        .update(
            tc.id,
            UpdateTestCaseRequest {
                status: Some(TestCaseStatus::Reproved),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut recipients: Vec<_> = notifier.sent().iter().map(|n| n.user_id).collect();
    recipients.sort();
    let mut expected = vec![fixture.creator.id, fixture.member.id];
    expected.sort();
    assert_eq!(recipients, expected);
    assert!(filer.filed().is_empty());
}

#[actix_rt::test]
async fn test_pending_to_pending_is_silent() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let filer = Arc::new(RecordingBugFiler::default());
    let engine = recording_engine(&pool, notifier.clone(), filer.clone());

    let mut req = create_request(&fixture, "Idle");
    req.bug_responsible_id = Some(fixture.developer.id);
    let tc = engine.create(req).await.unwrap();

    engine
        .update(
            tc.id,
            UpdateTestCaseRequest {
                status: Some(TestCaseStatus::Pending),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(notifier.sent().is_empty());
    assert!(filer.filed().is_empty());
}

#[actix_rt::test]
async fn test_resaving_reproved_does_not_refile() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let filer = Arc::new(RecordingBugFiler::default());
    let engine = recording_engine(&pool, notifier.clone(), filer.clone());

    let mut req = create_request(&fixture, "Flaky upload");
    req.status = Some(TestCaseStatus::Reproved);
    req.bug_responsible_id = Some(fixture.developer.id);
    let tc = engine.create(req).await.unwrap();

    engine
        .update(
            tc.id,
            UpdateTestCaseRequest {
                status: Some(TestCaseStatus::Reproved),
                description: Some("still failing".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(filer.filed().len(), 1);
    assert_eq!(notifier.sent().len(), 1);
}

#[actix_rt::test]
async fn test_responsible_change_notifies_once() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = recording_engine(&pool, notifier.clone(), Arc::default());

    let tc = engine.create(create_request(&fixture, "Signup")).await.unwrap();
    assert!(notifier.sent().is_empty());

    let assign = || UpdateTestCaseRequest {
        responsible_id: Some(Some(fixture.assignee.id)),
        ..Default::default()
    };

    let updated = engine.update(tc.id, assign()).await.unwrap();
    assert_eq!(updated.responsible_id, Some(fixture.assignee.id));
    engine.update(tc.id, assign()).await.unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id, fixture.assignee.id);
    assert_eq!(sent[0].kind, NotificationKind::TestCaseAssignment);
}

#[actix_rt::test]
async fn test_side_effect_failures_do_not_fail_the_update() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let notifier = Arc::new(RecordingNotifier {
        fail: true,
        ..Default::default()
    });
    let filer = Arc::new(RecordingBugFiler {
        fail: true,
        ..Default::default()
    });
    let engine = recording_engine(&pool, notifier, filer);

    let mut req = create_request(&fixture, "Reports");
    req.bug_responsible_id = Some(fixture.developer.id);
    let tc = engine.create(req).await.unwrap();

    let updated = engine
        .update(
            tc.id,
            UpdateTestCaseRequest {
                status: Some(TestCaseStatus::Reproved),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TestCaseStatus::Reproved);

    let stored = engine.get(tc.id).await.unwrap();
    assert_eq!(stored.status, TestCaseStatus::Reproved);
}
