//! Domain models for the test case lifecycle server.

pub mod bug;
pub mod notification;
pub mod test_case;
pub mod ws_event;

// Re-export commonly used types
pub use bug::{Bug, BugListResponse, BugStatus, NewBug};
pub use notification::{Notice, Notification, NotificationKind, NotificationListResponse};
pub use test_case::{
    AddScriptRequest, CreateTestCaseRequest, Priority, Script, ScriptListResponse, TestCase,
    TestCaseListResponse, TestCaseStatus, TestKind, TestType, UpdateTestCaseRequest,
};
pub use ws_event::{WsEvent, WsEventMessage};
