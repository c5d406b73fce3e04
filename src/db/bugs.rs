//! Database operations for bugs filed from failed test cases.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::DbPool;
use crate::entity::bug::{self, Entity as Bug};
use crate::error::{AppError, AppResult};
use crate::models::{BugStatus, NewBug};

/// Insert a new bug in `OPEN` status.
pub async fn insert_bug<C>(db: &C, new_bug: &NewBug) -> AppResult<bug::Model>
where
    C: ConnectionTrait,
{
    let now = Utc::now();

    let model = bug::ActiveModel {
        id: Set(Uuid::now_v7()),
        test_case_id: Set(new_bug.test_case_id),
        title: Set(new_bug.title.clone()),
        description: Set(new_bug.description.clone()),
        steps: Set(Some(new_bug.steps.clone())),
        expected_result: Set(Some(new_bug.expected_result.clone())),
        status: Set(BugStatus::Open.as_str().to_string()),
        priority: Set(new_bug.priority.as_str().to_string()),
        assigned_developer_id: Set(Some(new_bug.assigned_developer_id)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model
        .insert(db)
        .await
        .map_err(|e| AppError::from_db("Failed to insert bug", e))
}

impl DbPool {
    /// Bugs filed against a test case, oldest first.
    pub async fn list_bugs_for_test_case(&self, test_case_id: Uuid) -> AppResult<Vec<bug::Model>> {
        Bug::find()
            .filter(bug::Column::TestCaseId.eq(test_case_id))
            .order_by_asc(bug::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list bugs: {}", e)))
    }
}
