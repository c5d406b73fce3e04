//! Test case API handlers.

use actix_web::{HttpResponse, web};
use tracing::info;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    AddScriptRequest, BugListResponse, CreateTestCaseRequest, ScriptListResponse, TestCase,
    TestCaseListResponse, UpdateTestCaseRequest,
};
use crate::services::TestCaseEngine;

/// Create a test case.
///
/// Numbers the test case from its project's counter and stores the given
/// scripts as versions 1..n. A failing initial status triggers the failure
/// cascade once the test case is committed.
#[utoipa::path(
    post,
    path = "/test-cases",
    tag = "Test Cases",
    request_body = CreateTestCaseRequest,
    responses(
        (status = 201, description = "Test case created", body = TestCase),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Project or referenced entity not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Project counter busy, retry", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_test_case(
    engine: web::Data<TestCaseEngine>,
    body: web::Json<CreateTestCaseRequest>,
) -> AppResult<HttpResponse> {
    let test_case = engine.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(test_case))
}

/// Get a test case with its script history.
#[utoipa::path(
    get,
    path = "/test-cases/{id}",
    tag = "Test Cases",
    params(
        ("id" = Uuid, Path, description = "Test case UUID")
    ),
    responses(
        (status = 200, description = "Test case", body = TestCase),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_test_case(
    engine: web::Data<TestCaseEngine>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let test_case = engine.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(test_case))
}

/// Partially update a test case.
///
/// Absent fields are left untouched; `null` clears nullable references.
#[utoipa::path(
    patch,
    path = "/test-cases/{id}",
    tag = "Test Cases",
    params(
        ("id" = Uuid, Path, description = "Test case UUID")
    ),
    request_body = UpdateTestCaseRequest,
    responses(
        (status = 200, description = "Test case updated", body = TestCase),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Test case or referenced entity not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Concurrent modification, retry", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_test_case(
    engine: web::Data<TestCaseEngine>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateTestCaseRequest>,
) -> AppResult<HttpResponse> {
    let test_case = engine.update(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(test_case))
}

/// Delete a test case together with its scripts and bugs.
#[utoipa::path(
    delete,
    path = "/test-cases/{id}",
    tag = "Test Cases",
    params(
        ("id" = Uuid, Path, description = "Test case UUID")
    ),
    responses(
        (status = 204, description = "Test case deleted"),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_test_case(
    engine: web::Data<TestCaseEngine>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    engine.delete(id).await?;
    info!(test_case_id = %id, "Delete request completed");
    Ok(HttpResponse::NoContent().finish())
}

/// Append a script version to a test case.
///
/// The new version records the test case's current status.
#[utoipa::path(
    post,
    path = "/test-cases/{id}/scripts",
    tag = "Scripts",
    params(
        ("id" = Uuid, Path, description = "Test case UUID")
    ),
    request_body = AddScriptRequest,
    responses(
        (status = 201, description = "Script version added", body = TestCase),
        (status = 400, description = "Invalid script path", body = crate::error::ErrorResponse),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Concurrent append, retry", body = crate::error::ErrorResponse),
    )
)]
pub async fn add_script(
    engine: web::Data<TestCaseEngine>,
    path: web::Path<Uuid>,
    body: web::Json<AddScriptRequest>,
) -> AppResult<HttpResponse> {
    let test_case = engine.add_script(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(test_case))
}

/// List the script versions of a test case, oldest first.
#[utoipa::path(
    get,
    path = "/test-cases/{id}/scripts",
    tag = "Scripts",
    params(
        ("id" = Uuid, Path, description = "Test case UUID")
    ),
    responses(
        (status = 200, description = "Script versions", body = ScriptListResponse),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_test_case_scripts(
    engine: web::Data<TestCaseEngine>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let scripts = engine.list_scripts(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ScriptListResponse { scripts }))
}

/// List bugs filed from a test case's failures.
#[utoipa::path(
    get,
    path = "/test-cases/{id}/bugs",
    tag = "Test Cases",
    params(
        ("id" = Uuid, Path, description = "Test case UUID")
    ),
    responses(
        (status = 200, description = "Filed bugs", body = BugListResponse),
        (status = 404, description = "Test case not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_test_case_bugs(
    engine: web::Data<TestCaseEngine>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let bugs = engine.list_bugs(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(BugListResponse { bugs }))
}

/// List a project's test cases ordered by sequence number.
#[utoipa::path(
    get,
    path = "/projects/{project_id}/test-cases",
    tag = "Projects",
    params(
        ("project_id" = Uuid, Path, description = "Project UUID")
    ),
    responses(
        (status = 200, description = "Test cases", body = TestCaseListResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_project_test_cases(
    engine: web::Data<TestCaseEngine>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let test_cases = engine.list_by_project(path.into_inner()).await?;
    let total = test_cases.len();
    Ok(HttpResponse::Ok().json(TestCaseListResponse { test_cases, total }))
}

/// List every script of a project, newest first.
#[utoipa::path(
    get,
    path = "/projects/{project_id}/scripts",
    tag = "Projects",
    params(
        ("project_id" = Uuid, Path, description = "Project UUID")
    ),
    responses(
        (status = 200, description = "Scripts", body = ScriptListResponse),
        (status = 404, description = "Project not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_project_scripts(
    engine: web::Data<TestCaseEngine>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let scripts = engine.list_project_scripts(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ScriptListResponse { scripts }))
}

/// Configure test case routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/test-cases").route(web::post().to(create_test_case)))
        .service(
            web::resource("/test-cases/{id}")
                .route(web::get().to(get_test_case))
                .route(web::patch().to(update_test_case))
                .route(web::put().to(update_test_case))
                .route(web::delete().to(delete_test_case)),
        )
        .service(
            web::resource("/test-cases/{id}/scripts")
                .route(web::get().to(list_test_case_scripts))
                .route(web::post().to(add_script)),
        )
        .service(web::resource("/test-cases/{id}/bugs").route(web::get().to(list_test_case_bugs)))
        .service(
            web::resource("/projects/{project_id}/test-cases")
                .route(web::get().to(list_project_test_cases)),
        )
        .service(
            web::resource("/projects/{project_id}/scripts")
                .route(web::get().to(list_project_scripts)),
        );
}
