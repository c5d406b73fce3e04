//! Bug domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::test_case::Priority;
use crate::entity::bug;

/// Bug workflow status. Bugs filed by the engine always start `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BugStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    Reopened,
}

impl BugStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
            Self::Reopened => "REOPENED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(Self::Open),
            "IN_PROGRESS" => Some(Self::InProgress),
            "RESOLVED" => Some(Self::Resolved),
            "CLOSED" => Some(Self::Closed),
            "REOPENED" => Some(Self::Reopened),
            _ => None,
        }
    }
}

/// Defect to be filed for a failed test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBug {
    /// `<prefix>-<sequence> <title>`
    pub title: String,
    pub description: String,
    pub steps: String,
    pub expected_result: String,
    pub priority: Priority,
    pub test_case_id: Uuid,
    pub assigned_developer_id: Uuid,
}

/// Stored bug as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Bug {
    pub id: Uuid,
    pub test_case_id: Uuid,
    pub title: String,
    pub description: String,
    pub steps: Option<String>,
    pub expected_result: Option<String>,
    pub status: BugStatus,
    pub priority: Priority,
    pub assigned_developer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<bug::Model> for Bug {
    fn from(m: bug::Model) -> Self {
        Bug {
            id: m.id,
            test_case_id: m.test_case_id,
            title: m.title,
            description: m.description,
            steps: m.steps,
            expected_result: m.expected_result,
            status: BugStatus::parse(&m.status).unwrap_or(BugStatus::Open),
            priority: Priority::parse(&m.priority).unwrap_or_default(),
            assigned_developer_id: m.assigned_developer_id,
            created_at: m.created_at,
        }
    }
}

/// Response for bugs filed against a test case.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BugListResponse {
    pub bugs: Vec<Bug>,
}
