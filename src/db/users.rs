//! Database operations for users.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::entity::user::{self, Entity as User};
use crate::error::{AppError, AppResult};

/// Find a user by ID.
pub async fn find_user<C>(db: &C, id: Uuid) -> AppResult<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get user: {}", e)))
}

/// Fail with `NotFound` unless the referenced user exists.
pub async fn require_user<C>(db: &C, id: Uuid, field: &str) -> AppResult<user::Model>
where
    C: ConnectionTrait,
{
    find_user(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} ({})", id, field)))
}

/// Insert a user.
pub async fn insert_user<C>(db: &C, name: &str, email: &str) -> AppResult<user::Model>
where
    C: ConnectionTrait,
{
    let now = Utc::now();

    let model = user::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model
        .insert(db)
        .await
        .map_err(|e| AppError::from_db("Failed to insert user", e))
}
