//! Test case domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{script, test_case};
use crate::error::{AppError, AppResult};

/// Maximum title length (matches the column definition).
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum script path length (matches the column definition).
pub const MAX_SCRIPT_PATH_LENGTH: usize = 1000;

/// Test case status.
///
/// Any status may be set by an update; the engine reacts to the
/// previous/new pair rather than enforcing a transition table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestCaseStatus {
    #[default]
    Pending,
    InProgress,
    Approved,
    /// Failed. Entering this status triggers the failure cascade.
    Reproved,
    Blocked,
    Finished,
    Canceled,
}

impl TestCaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Approved => "APPROVED",
            Self::Reproved => "REPROVED",
            Self::Blocked => "BLOCKED",
            Self::Finished => "FINISHED",
            Self::Canceled => "CANCELED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "IN_PROGRESS" => Some(Self::InProgress),
            "APPROVED" => Some(Self::Approved),
            "REPROVED" => Some(Self::Reproved),
            "BLOCKED" => Some(Self::Blocked),
            "FINISHED" => Some(Self::Finished),
            "CANCELED" => Some(Self::Canceled),
            _ => None,
        }
    }

    /// Whether this status represents a failed execution.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Reproved)
    }
}

impl std::fmt::Display for TestCaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority shared by test cases and the bugs filed from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[serde(rename = "NONE")]
    Unassigned,
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unassigned => "NONE",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NONE" => Some(Self::Unassigned),
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed test type catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestType {
    Manual,
    Functional,
    Integration,
    Unit,
    EndToEnd,
    Performance,
    Security,
    Usability,
    Regression,
    Acceptance,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::Functional => "FUNCTIONAL",
            Self::Integration => "INTEGRATION",
            Self::Unit => "UNIT",
            Self::EndToEnd => "END_TO_END",
            Self::Performance => "PERFORMANCE",
            Self::Security => "SECURITY",
            Self::Usability => "USABILITY",
            Self::Regression => "REGRESSION",
            Self::Acceptance => "ACCEPTANCE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MANUAL" => Some(Self::Manual),
            "FUNCTIONAL" => Some(Self::Functional),
            "INTEGRATION" => Some(Self::Integration),
            "UNIT" => Some(Self::Unit),
            "END_TO_END" => Some(Self::EndToEnd),
            "PERFORMANCE" => Some(Self::Performance),
            "SECURITY" => Some(Self::Security),
            "USABILITY" => Some(Self::Usability),
            "REGRESSION" => Some(Self::Regression),
            "ACCEPTANCE" => Some(Self::Acceptance),
            _ => None,
        }
    }
}

/// The type of a test case: either a fixed catalogue entry or an
/// organization-defined custom type, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    Builtin(TestType),
    Custom(Uuid),
}

impl TestKind {
    /// Resolve the two optional request fields into at most one kind.
    ///
    /// Returns `Ok(None)` when neither is supplied and `InvalidInput` when
    /// both are.
    pub fn from_request(
        test_type: Option<TestType>,
        custom_test_type_id: Option<Uuid>,
    ) -> AppResult<Option<Self>> {
        match (test_type, custom_test_type_id) {
            (Some(_), Some(_)) => Err(AppError::InvalidInput(
                "test_type and custom_test_type_id are mutually exclusive".to_string(),
            )),
            (Some(t), None) => Ok(Some(Self::Builtin(t))),
            (None, Some(id)) => Ok(Some(Self::Custom(id))),
            (None, None) => Ok(None),
        }
    }

    /// Column values to persist; exactly one side is `Some`.
    pub fn columns(&self) -> (Option<String>, Option<Uuid>) {
        match self {
            Self::Builtin(t) => (Some(t.as_str().to_string()), None),
            Self::Custom(id) => (None, Some(*id)),
        }
    }
}

/// Deserialize a field that distinguishes "absent" from explicit `null`.
///
/// Used with `#[serde(default)]`: absent → `None`, `null` → `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request to create a test case.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTestCaseRequest {
    pub project_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: String,
    #[serde(default)]
    pub expected_result: String,
    #[serde(default)]
    pub priority: Priority,
    /// Initial status (default: PENDING).
    #[serde(default)]
    pub status: Option<TestCaseStatus>,
    /// Fixed test type. Mutually exclusive with `custom_test_type_id`.
    #[serde(default)]
    pub test_type: Option<TestType>,
    /// Organization-defined test type.
    #[serde(default)]
    pub custom_test_type_id: Option<Uuid>,
    pub created_by_id: Uuid,
    #[serde(default)]
    pub responsible_id: Option<Uuid>,
    /// Developer who receives the bug filed when this test case fails.
    #[serde(default)]
    pub bug_responsible_id: Option<Uuid>,
    #[serde(default)]
    pub test_scenario_id: Option<Uuid>,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub task_link: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Script paths, versioned 1..n in the order given.
    #[serde(default)]
    pub scripts: Vec<String>,
}

impl CreateTestCaseRequest {
    /// Field-level validation that needs no database access.
    ///
    /// A new test case needs exactly one of `test_type` and
    /// `custom_test_type_id`.
    pub fn validate(&self) -> AppResult<TestKind> {
        validate_title(&self.title)?;
        validate_script_paths(&self.scripts)?;
        TestKind::from_request(self.test_type, self.custom_test_type_id)?.ok_or_else(|| {
            AppError::InvalidInput(
                "one of test_type or custom_test_type_id is required".to_string(),
            )
        })
    }
}

/// Partial update of a test case. Absent fields are left untouched; nullable
/// references accept an explicit `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateTestCaseRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Option<String>,
    #[serde(default)]
    pub expected_result: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<TestCaseStatus>,
    #[serde(default)]
    pub test_type: Option<TestType>,
    #[serde(default)]
    pub custom_test_type_id: Option<Uuid>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub responsible_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub bug_responsible_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub test_scenario_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub estimated_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub task_link: Option<Option<String>>,
    #[serde(default)]
    pub attachments: Option<Vec<String>>,
    /// New script versions appended after the update is applied.
    #[serde(default)]
    pub scripts: Vec<String>,
}

impl UpdateTestCaseRequest {
    /// Field-level validation that needs no database access.
    pub fn validate(&self) -> AppResult<Option<TestKind>> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        validate_script_paths(&self.scripts)?;
        TestKind::from_request(self.test_type, self.custom_test_type_id)
    }
}

/// Request to append a script version.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddScriptRequest {
    /// Opaque reference to the stored script content.
    pub script_path: String,
}

impl AddScriptRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_script_path(&self.script_path)
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("title must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

fn validate_script_paths(paths: &[String]) -> AppResult<()> {
    paths.iter().try_for_each(|p| validate_script_path(p))
}

fn validate_script_path(path: &str) -> AppResult<()> {
    if path.trim().is_empty() {
        return Err(AppError::InvalidInput("script path must not be empty".to_string()));
    }
    if path.len() > MAX_SCRIPT_PATH_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "script path must be at most {} bytes",
            MAX_SCRIPT_PATH_LENGTH
        )));
    }
    Ok(())
}

/// One script version as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Script {
    pub id: Uuid,
    pub test_case_id: Uuid,
    pub version: i32,
    pub script_path: String,
    /// Test case status while this version was the latest.
    pub status: TestCaseStatus,
    pub status_set_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<script::Model> for Script {
    fn from(m: script::Model) -> Self {
        Script {
            id: m.id,
            test_case_id: m.test_case_id,
            version: m.version,
            script_path: m.script_path,
            status: TestCaseStatus::parse(&m.status).unwrap_or_default(),
            status_set_at: m.status_set_at,
            created_at: m.created_at,
        }
    }
}

/// Test case with its script history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TestCase {
    pub id: Uuid,
    pub project_id: Uuid,
    pub project_sequence_id: i32,
    /// `<prefix>-<project_sequence_id>`, e.g. `TT-12`.
    pub display_key: String,
    pub title: String,
    pub description: String,
    pub steps: String,
    pub expected_result: String,
    pub status: TestCaseStatus,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_type: Option<TestType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_test_type_id: Option<Uuid>,
    pub test_scenario_id: Option<Uuid>,
    pub created_by_id: Uuid,
    pub responsible_id: Option<Uuid>,
    pub bug_responsible_id: Option<Uuid>,
    pub estimated_time: Option<String>,
    pub task_link: Option<String>,
    pub attachments: Vec<String>,
    /// Script versions in ascending order.
    pub scripts: Vec<Script>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TestCase {
    /// Build the API view from a row, its project prefix and its scripts.
    pub fn from_model(m: test_case::Model, prefix: &str, scripts: Vec<script::Model>) -> Self {
        let mut scripts: Vec<Script> = scripts.into_iter().map(Script::from).collect();
        scripts.sort_by_key(|s| s.version);

        TestCase {
            id: m.id,
            project_id: m.project_id,
            project_sequence_id: m.project_sequence_id,
            display_key: display_key(prefix, m.project_sequence_id),
            title: m.title,
            description: m.description,
            steps: m.steps,
            expected_result: m.expected_result,
            status: TestCaseStatus::parse(&m.status).unwrap_or_default(),
            priority: Priority::parse(&m.priority).unwrap_or_default(),
            test_type: m.test_type.as_deref().and_then(TestType::parse),
            custom_test_type_id: m.custom_test_type_id,
            test_scenario_id: m.test_scenario_id,
            created_by_id: m.created_by_id,
            responsible_id: m.responsible_id,
            bug_responsible_id: m.bug_responsible_id,
            estimated_time: m.estimated_time,
            task_link: m.task_link,
            attachments: attachments_from_json(m.attachments.as_ref()),
            scripts,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    /// The most recent script version, if any.
    pub fn latest_script(&self) -> Option<&Script> {
        self.scripts.iter().max_by_key(|s| s.version)
    }
}

/// Human-facing key combining project prefix and sequence number.
pub fn display_key(prefix: &str, sequence_id: i32) -> String {
    format!("{}-{}", prefix, sequence_id)
}

pub fn attachments_to_json(attachments: &[String]) -> Option<JsonValue> {
    serde_json::to_value(attachments).ok()
}

pub fn attachments_from_json(value: Option<&JsonValue>) -> Vec<String> {
    value
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

/// Response for project test case listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TestCaseListResponse {
    pub test_cases: Vec<TestCase>,
    pub total: usize,
}

/// Response for script listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScriptListResponse {
    pub scripts: Vec<Script>,
}
