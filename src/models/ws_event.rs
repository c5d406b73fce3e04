//! WebSocket event types for real-time updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::notification::NotificationKind;
use super::test_case::{TestCase, TestCaseStatus};

/// WebSocket event sent to connected clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
#[serde(rename_all = "snake_case")]
pub enum WsEvent {
    /// A test case was created.
    TestCaseCreated(TestCaseChangedPayload),
    /// A test case was updated or received a new script version.
    TestCaseUpdated(TestCaseChangedPayload),
    /// A test case was deleted.
    TestCaseDeleted(TestCaseDeletedPayload),
    /// A notification was stored for a user.
    NotificationCreated(NotificationCreatedPayload),
}

/// Payload for test_case_created / test_case_updated events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseChangedPayload {
    pub test_case_id: Uuid,
    pub project_id: Uuid,
    pub display_key: String,
    pub status: TestCaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_script_version: Option<i32>,
}

/// Payload for test_case_deleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseDeletedPayload {
    pub test_case_id: Uuid,
    pub project_id: Uuid,
}

/// Payload for notification_created event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationCreatedPayload {
    pub notification_id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
}

/// Wrapper that includes timestamp with every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsEventMessage {
    #[serde(flatten)]
    pub event: WsEvent,
    pub timestamp: DateTime<Utc>,
}

impl WsEventMessage {
    /// Create a new event message with the current timestamp.
    pub fn new(event: WsEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }
}

impl WsEvent {
    fn changed_payload(test_case: &TestCase) -> TestCaseChangedPayload {
        TestCaseChangedPayload {
            test_case_id: test_case.id,
            project_id: test_case.project_id,
            display_key: test_case.display_key.clone(),
            status: test_case.status,
            latest_script_version: test_case.latest_script().map(|s| s.version),
        }
    }

    pub fn test_case_created(test_case: &TestCase) -> Self {
        WsEvent::TestCaseCreated(Self::changed_payload(test_case))
    }

    pub fn test_case_updated(test_case: &TestCase) -> Self {
        WsEvent::TestCaseUpdated(Self::changed_payload(test_case))
    }

    pub fn test_case_deleted(test_case_id: Uuid, project_id: Uuid) -> Self {
        WsEvent::TestCaseDeleted(TestCaseDeletedPayload {
            test_case_id,
            project_id,
        })
    }

    pub fn notification_created(notification_id: Uuid, user_id: Uuid, kind: NotificationKind) -> Self {
        WsEvent::NotificationCreated(NotificationCreatedPayload {
            notification_id,
            user_id,
            kind,
        })
    }
}
