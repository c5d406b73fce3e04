//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TestTrack Server",
        version = "0.1.0",
        description = "Test case lifecycle API: project-numbered test cases, versioned scripts and failure notifications"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Test case endpoints
        api::test_cases::create_test_case,
        api::test_cases::get_test_case,
        api::test_cases::update_test_case,
        api::test_cases::delete_test_case,
        api::test_cases::list_test_case_bugs,
        // Script endpoints
        api::test_cases::add_script,
        api::test_cases::list_test_case_scripts,
        // Project endpoints
        api::test_cases::list_project_test_cases,
        api::test_cases::list_project_scripts,
        // Notification endpoints
        api::notifications::list_user_notifications,
        api::notifications::mark_notification_read,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Test cases
            models::TestCaseStatus,
            models::Priority,
            models::TestType,
            models::CreateTestCaseRequest,
            models::UpdateTestCaseRequest,
            models::TestCase,
            models::TestCaseListResponse,
            // Scripts
            models::AddScriptRequest,
            models::Script,
            models::ScriptListResponse,
            // Bugs
            models::BugStatus,
            models::Bug,
            models::BugListResponse,
            // Notifications
            models::NotificationKind,
            models::Notification,
            models::NotificationListResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Test Cases", description = "Test case lifecycle"),
        (name = "Scripts", description = "Versioned test scripts"),
        (name = "Projects", description = "Project-scoped listings"),
        (name = "Notifications", description = "User notification inbox")
    )
)]
pub struct ApiDoc;
