//! Business logic services.

pub mod collaborators;
pub mod event_broadcaster;
pub mod lifecycle;

pub use collaborators::{BugFiler, DbBugFiler, DbNotificationDispatcher, NotificationDispatcher};
pub use event_broadcaster::EventBroadcaster;
pub use lifecycle::{EffectDispatcher, TestCaseEngine};
