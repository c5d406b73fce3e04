//! Database operations for test cases.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entity::test_case::{self, Entity as TestCase};
use crate::error::{AppError, AppResult};

/// Insert a fully populated test case row.
pub async fn insert_test_case<C>(db: &C, model: test_case::ActiveModel) -> AppResult<test_case::Model>
where
    C: ConnectionTrait,
{
    model
        .insert(db)
        .await
        .map_err(|e| AppError::from_db("Failed to insert test case", e))
}

/// Get a test case by ID.
pub async fn find_test_case<C>(db: &C, id: Uuid) -> AppResult<Option<test_case::Model>>
where
    C: ConnectionTrait,
{
    TestCase::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get test case: {}", e)))
}

/// Load a test case with `FOR UPDATE`, serializing writers of the same row
/// until `txn` ends.
pub async fn lock_test_case(txn: &DatabaseTransaction, id: Uuid) -> AppResult<test_case::Model> {
    TestCase::find_by_id(id)
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(|e| AppError::from_db("Failed to lock test case", e))?
        .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))
}

/// Persist changed columns of a test case.
pub async fn update_test_case<C>(db: &C, model: test_case::ActiveModel) -> AppResult<test_case::Model>
where
    C: ConnectionTrait,
{
    model
        .update(db)
        .await
        .map_err(|e| AppError::from_db("Failed to update test case", e))
}

/// All test cases of a project ordered by sequence number.
pub async fn list_by_project<C>(db: &C, project_id: Uuid) -> AppResult<Vec<test_case::Model>>
where
    C: ConnectionTrait,
{
    TestCase::find()
        .filter(test_case::Column::ProjectId.eq(project_id))
        .order_by_asc(test_case::Column::ProjectSequenceId)
        .all(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list test cases: {}", e)))
}

/// Delete a test case. Scripts and bugs go with it via `ON DELETE CASCADE`.
///
/// Returns whether a row was removed.
pub async fn delete_test_case<C>(db: &C, id: Uuid) -> AppResult<bool>
where
    C: ConnectionTrait,
{
    let result = TestCase::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to delete test case: {}", e)))?;

    Ok(result.rows_affected > 0)
}
