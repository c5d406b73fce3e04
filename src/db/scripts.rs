//! Versioned script storage.
//!
//! Versions of one test case run 1..k without gaps. Each version carries the
//! test case status captured while it was the latest one, so the history
//! shows which status every revision ended in.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use tracing::debug;
use uuid::Uuid;

use super::DbPool;
use crate::entity::script::{self, Entity as Script};
use crate::entity::test_case;
use crate::error::{AppError, AppResult};
use crate::models::TestCaseStatus;

/// Highest-versioned script of a test case.
pub async fn latest_script<C>(db: &C, test_case_id: Uuid) -> AppResult<Option<script::Model>>
where
    C: ConnectionTrait,
{
    Script::find()
        .filter(script::Column::TestCaseId.eq(test_case_id))
        .order_by_desc(script::Column::Version)
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get latest script: {}", e)))
}

/// Append the next script version for a test case.
///
/// The caller must hold the test case row lock (or be creating the row in the
/// same transaction); the unique `(test_case_id, version)` index turns any
/// race that slips past it into `Conflict`.
pub async fn append_script(
    txn: &DatabaseTransaction,
    test_case: &test_case::Model,
    script_path: &str,
) -> AppResult<script::Model> {
    let version = match latest_script(txn, test_case.id).await? {
        Some(latest) => latest.version + 1,
        None => 1,
    };
    let now = Utc::now();

    let model = script::ActiveModel {
        id: Set(Uuid::now_v7()),
        test_case_id: Set(test_case.id),
        version: Set(version),
        script_path: Set(script_path.to_string()),
        status: Set(test_case.status.clone()),
        status_set_at: Set(now),
        created_at: Set(now),
    };

    let inserted = model
        .insert(txn)
        .await
        .map_err(|e| AppError::from_db("Failed to append script", e))?;

    debug!(test_case_id = %test_case.id, version, "Appended script version");

    Ok(inserted)
}

/// Append several versions in the given order.
pub async fn append_scripts(
    txn: &DatabaseTransaction,
    test_case: &test_case::Model,
    script_paths: &[String],
) -> AppResult<Vec<script::Model>> {
    let mut appended = Vec::with_capacity(script_paths.len());
    for path in script_paths {
        appended.push(append_script(txn, test_case, path).await?);
    }
    Ok(appended)
}

/// Copy `status` onto the latest version when it differs.
///
/// Returns the updated row, or `None` when there are no versions or the
/// status already matches (the stored timestamp is then left alone).
pub async fn resync_latest_version_status<C>(
    db: &C,
    test_case_id: Uuid,
    status: TestCaseStatus,
) -> AppResult<Option<script::Model>>
where
    C: ConnectionTrait,
{
    let Some(latest) = latest_script(db, test_case_id).await? else {
        return Ok(None);
    };
    if latest.status == status.as_str() {
        return Ok(None);
    }

    let version = latest.version;
    let mut active: script::ActiveModel = latest.into();
    active.status = Set(status.as_str().to_string());
    active.status_set_at = Set(Utc::now());

    let updated = active
        .update(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to resync script status: {}", e)))?;

    debug!(test_case_id = %test_case_id, version, status = %status, "Resynced latest script status");

    Ok(Some(updated))
}

/// All versions of a test case in ascending order.
pub async fn scripts_for_test_case<C>(db: &C, test_case_id: Uuid) -> AppResult<Vec<script::Model>>
where
    C: ConnectionTrait,
{
    Script::find()
        .filter(script::Column::TestCaseId.eq(test_case_id))
        .order_by_asc(script::Column::Version)
        .all(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list scripts: {}", e)))
}

/// Versions of many test cases, grouped by test case.
pub async fn scripts_for_test_cases<C>(
    db: &C,
    test_case_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<script::Model>>>
where
    C: ConnectionTrait,
{
    if test_case_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = Script::find()
        .filter(script::Column::TestCaseId.is_in(test_case_ids.iter().copied()))
        .order_by_asc(script::Column::Version)
        .all(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list scripts: {}", e)))?;

    let mut grouped: HashMap<Uuid, Vec<script::Model>> = HashMap::new();
    for row in rows {
        grouped.entry(row.test_case_id).or_default().push(row);
    }
    Ok(grouped)
}

impl DbPool {
    /// Every script of a project's test cases, newest first.
    pub async fn list_project_scripts(&self, project_id: Uuid) -> AppResult<Vec<script::Model>> {
        Script::find()
            .join(JoinType::InnerJoin, script::Relation::TestCase.def())
            .filter(test_case::Column::ProjectId.eq(project_id))
            .order_by_desc(script::Column::CreatedAt)
            .order_by_desc(script::Column::Version)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list project scripts: {}", e)))
    }
}
