//! Notification domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::notification;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// A test case entered REPROVED.
    TestCaseFailed,
    /// The recipient became responsible for a test case.
    TestCaseAssignment,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TestCaseFailed => "TEST_CASE_FAILED",
            Self::TestCaseAssignment => "TEST_CASE_ASSIGNMENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TEST_CASE_FAILED" => Some(Self::TestCaseFailed),
            "TEST_CASE_ASSIGNMENT" => Some(Self::TestCaseAssignment),
            _ => None,
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification waiting to be delivered to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub link: Option<String>,
}

/// Stored notification as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Rows with an unknown kind are skipped by callers.
    pub fn from_model(m: notification::Model) -> Option<Self> {
        Some(Notification {
            id: m.id,
            user_id: m.user_id,
            kind: NotificationKind::parse(&m.kind)?,
            message: m.message,
            link: m.link,
            read: m.read,
            created_at: m.created_at,
        })
    }
}

/// Response for a user's notification inbox.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub unread: usize,
}
