//! E2E tests: HTTP API with the database-backed collaborators.

use actix_web::test;
use serde_json::{Value, json};

use super::test_helpers::*;

#[actix_rt::test]
async fn test_create_get_and_list() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/test-cases")
        .set_json(json!({
            "project_id": fixture.project.id,
            "title": "Login works",
            "created_by_id": fixture.creator.id,
            "test_type": "MANUAL",
            "scripts": ["scripts/login.spec.ts"],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["display_key"], "TT-1");
    assert_eq!(created["status"], "PENDING");
    assert_eq!(created["scripts"][0]["version"], 1);

    let id = created["id"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/test-cases/{}", id))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["title"], "Login works");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/projects/{}/test-cases", fixture.project.id))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed["total"], 1);
}

#[actix_rt::test]
async fn test_both_types_is_bad_request() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/test-cases")
        .set_json(json!({
            "project_id": fixture.project.id,
            "title": "Ambiguous",
            "created_by_id": fixture.creator.id,
            "test_type": "UNIT",
            "custom_test_type_id": uuid::Uuid::now_v7(),
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_failure_lands_in_inbox_and_bug_list() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/test-cases")
        .set_json(json!({
            "project_id": fixture.project.id,
            "title": "Payment",
            "created_by_id": fixture.creator.id,
            "bug_responsible_id": fixture.developer.id,
            "test_type": "FUNCTIONAL",
        }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/test-cases/{}", id))
        .set_json(json!({ "status": "REPROVED" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/test-cases/{}/bugs", id))
        .to_request();
    let bugs: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(bugs["bugs"].as_array().unwrap().len(), 1);
    assert_eq!(bugs["bugs"][0]["title"], "TT-1 Payment");
    assert_eq!(bugs["bugs"][0]["status"], "OPEN");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}/notifications", fixture.creator.id))
        .to_request();
    let inbox: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(inbox["unread"], 1);
    assert_eq!(inbox["notifications"][0]["kind"], "TEST_CASE_FAILED");

    let notification_id = inbox["notifications"][0]["id"].as_str().unwrap();
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/notifications/{}/read", notification_id))
        .to_request();
    let marked: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(marked["read"], true);
}

#[actix_rt::test]
async fn test_delete_then_not_found() {
    let Some(pool) = create_test_pool().await else { return };
    let fixture = seed(&pool).await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/test-cases")
        .set_json(json!({
            "project_id": fixture.project.id,
            "title": "Temporary",
            "created_by_id": fixture.creator.id,
            "test_type": "UNIT",
            "scripts": ["a.js", "b.js"],
        }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/test-cases/{}", id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/test-cases/{}", id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/projects/{}/scripts", fixture.project.id))
        .to_request();
    let scripts: Value = test::call_and_read_body_json(&app, req).await;
    assert!(scripts["scripts"].as_array().unwrap().is_empty());
}
