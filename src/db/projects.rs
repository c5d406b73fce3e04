//! Database operations for projects: lookup, membership and the per-project
//! test case counter.

use std::time::Duration;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QuerySelect, Set,
};
use tracing::debug;
use uuid::Uuid;

use crate::entity::project::{self, Entity as Project};
use crate::entity::project_user::{self, Entity as ProjectUser};
use crate::error::{AppError, AppResult};

/// Maximum prefix length (matches the column definition).
const MAX_PREFIX_LENGTH: usize = 10;

/// Get a project by ID.
pub async fn find_project<C>(db: &C, id: Uuid) -> AppResult<Option<project::Model>>
where
    C: ConnectionTrait,
{
    Project::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get project: {}", e)))
}

/// Issue the next test case number for a project.
///
/// Takes `SELECT ... FOR UPDATE` on the project row, so concurrent allocators
/// for the same project queue behind each other until the holding transaction
/// ends, while other projects are unaffected. Waiting longer than
/// `lock_timeout` yields `Conflict`. The increment only becomes visible if the
/// caller commits, so an aborted creation does not consume a number.
///
/// Returns the project row carrying the new counter value.
pub async fn lock_and_increment_counter(
    txn: &DatabaseTransaction,
    project_id: Uuid,
    lock_timeout: Duration,
) -> AppResult<project::Model> {
    // SET LOCAL is scoped to this transaction. Postgres reads 0 as "wait forever".
    txn.execute_unprepared(&format!(
        "SET LOCAL lock_timeout = '{}ms'",
        lock_timeout_millis(lock_timeout)
    ))
    .await
    .map_err(|e| AppError::Database(format!("Failed to set lock timeout: {}", e)))?;

    let project = Project::find_by_id(project_id)
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(|e| AppError::from_db("Failed to lock project", e))?
        .ok_or_else(|| AppError::NotFound(format!("Project {}", project_id)))?;

    let next = project
        .test_case_sequence
        .checked_add(1)
        .ok_or_else(|| AppError::Database(format!("Project {} sequence exhausted", project_id)))?;

    let mut active: project::ActiveModel = project.into();
    active.test_case_sequence = Set(next);
    active.updated_at = Set(Utc::now());

    let updated = active
        .update(txn)
        .await
        .map_err(|e| AppError::from_db("Failed to increment project sequence", e))?;

    debug!(project_id = %project_id, sequence = next, "Allocated test case sequence");

    Ok(updated)
}

/// IDs of every member of a project.
pub async fn member_ids<C>(db: &C, project_id: Uuid) -> AppResult<Vec<Uuid>>
where
    C: ConnectionTrait,
{
    let members = ProjectUser::find()
        .filter(project_user::Column::ProjectId.eq(project_id))
        .all(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get project members: {}", e)))?;

    Ok(members.into_iter().map(|m| m.user_id).collect())
}

/// Insert a project, deriving its prefix from the name.
pub async fn insert_project<C>(db: &C, organization_id: Uuid, name: &str) -> AppResult<project::Model>
where
    C: ConnectionTrait,
{
    let now = Utc::now();

    let model = project::ActiveModel {
        id: Set(Uuid::now_v7()),
        organization_id: Set(organization_id),
        name: Set(name.to_string()),
        prefix: Set(generate_prefix(name)),
        test_case_sequence: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model
        .insert(db)
        .await
        .map_err(|e| AppError::from_db("Failed to insert project", e))
}

/// Add a user to a project.
pub async fn add_member<C>(db: &C, project_id: Uuid, user_id: Uuid, role: &str) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let model = project_user::ActiveModel {
        id: Set(Uuid::now_v7()),
        project_id: Set(project_id),
        user_id: Set(user_id),
        role: Set(role.to_string()),
        created_at: Set(Utc::now()),
    };

    model
        .insert(db)
        .await
        .map_err(|e| AppError::from_db("Failed to add project member", e))?;

    Ok(())
}

/// Whole milliseconds for `lock_timeout`, never below 1.
fn lock_timeout_millis(lock_timeout: Duration) -> u128 {
    lock_timeout.as_millis().max(1)
}

/// Build a project prefix from the initials of its name, e.g.
/// "Test Track" → "TT".
pub fn generate_prefix(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(MAX_PREFIX_LENGTH)
        .collect()
}
