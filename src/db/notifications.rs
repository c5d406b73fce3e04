//! Database operations for the notification inbox.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::DbPool;
use crate::entity::notification::{self, Entity as Notification};
use crate::error::{AppError, AppResult};
use crate::models::Notice;

/// Store a notice as an unread notification.
pub async fn insert_notification<C>(db: &C, notice: &Notice) -> AppResult<notification::Model>
where
    C: ConnectionTrait,
{
    let model = notification::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(notice.user_id),
        kind: Set(notice.kind.as_str().to_string()),
        message: Set(notice.message.clone()),
        link: Set(notice.link.clone()),
        read: Set(false),
        created_at: Set(Utc::now()),
    };

    model
        .insert(db)
        .await
        .map_err(|e| AppError::from_db("Failed to insert notification", e))
}

impl DbPool {
    /// A user's notifications, newest first.
    pub async fn list_notifications(&self, user_id: Uuid) -> AppResult<Vec<notification::Model>> {
        Notification::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list notifications: {}", e)))
    }

    /// Mark a notification as read.
    pub async fn mark_notification_read(&self, id: Uuid) -> AppResult<notification::Model> {
        let existing = Notification::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get notification: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Notification {}", id)))?;

        if existing.read {
            return Ok(existing);
        }

        let mut active: notification::ActiveModel = existing.into();
        active.read = Set(true);
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to mark notification read: {}", e)))
    }
}
