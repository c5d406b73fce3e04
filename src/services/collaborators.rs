//! Post-commit collaborators: notification delivery and bug filing.
//!
//! The engine only sees the traits, so deployments (and tests) can swap the
//! database-backed implementations for anything else.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::db::{self, DbPool};
use crate::error::SideEffectError;
use crate::models::{NewBug, Notice, WsEvent};
use crate::services::EventBroadcaster;

/// Delivers a notice to one user.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(&self, notice: &Notice) -> Result<(), SideEffectError>;
}

/// Creates a defect record, returning its id.
#[async_trait]
pub trait BugFiler: Send + Sync {
    async fn file_bug(&self, bug: &NewBug) -> Result<Uuid, SideEffectError>;
}

/// Stores notices in the notification inbox and announces them on the
/// WebSocket feed.
#[derive(Clone)]
pub struct DbNotificationDispatcher {
    pool: DbPool,
    broadcaster: EventBroadcaster,
}

impl DbNotificationDispatcher {
    pub fn new(pool: DbPool, broadcaster: EventBroadcaster) -> Self {
        Self { pool, broadcaster }
    }
}

#[async_trait]
impl NotificationDispatcher for DbNotificationDispatcher {
    async fn notify(&self, notice: &Notice) -> Result<(), SideEffectError> {
        let stored = db::notifications::insert_notification(self.pool.connection(), notice)
            .await
            .map_err(|e| SideEffectError::Notification {
                user_id: notice.user_id,
                reason: e.to_string(),
            })?;

        debug!(notification_id = %stored.id, user_id = %notice.user_id, kind = %notice.kind, "Notification stored");

        self.broadcaster.publish(WsEvent::notification_created(
            stored.id,
            notice.user_id,
            notice.kind,
        ));
        Ok(())
    }
}

/// Files bugs into the local `bugs` table.
#[derive(Clone)]
pub struct DbBugFiler {
    pool: DbPool,
}

impl DbBugFiler {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BugFiler for DbBugFiler {
    async fn file_bug(&self, bug: &NewBug) -> Result<Uuid, SideEffectError> {
        let stored = db::bugs::insert_bug(self.pool.connection(), bug)
            .await
            .map_err(|e| SideEffectError::BugFiling {
                test_case_id: bug.test_case_id,
                reason: e.to_string(),
            })?;

        Ok(stored.id)
    }
}
