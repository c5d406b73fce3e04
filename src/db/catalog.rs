//! Database operations for organizations, custom test types and test
//! scenarios.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::entity::custom_test_type::{self, Entity as CustomTestType};
use crate::entity::organization;
use crate::entity::test_scenario::{self, Entity as TestScenario};
use crate::error::{AppError, AppResult};

/// Get a custom test type by ID.
pub async fn find_custom_test_type<C>(db: &C, id: Uuid) -> AppResult<Option<custom_test_type::Model>>
where
    C: ConnectionTrait,
{
    CustomTestType::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get custom test type: {}", e)))
}

/// Get a test scenario by ID.
pub async fn find_test_scenario<C>(db: &C, id: Uuid) -> AppResult<Option<test_scenario::Model>>
where
    C: ConnectionTrait,
{
    TestScenario::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get test scenario: {}", e)))
}

/// Insert an organization.
pub async fn insert_organization<C>(db: &C, name: &str) -> AppResult<organization::Model>
where
    C: ConnectionTrait,
{
    let now = Utc::now();

    organization::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(|e| AppError::from_db("Failed to insert organization", e))
}

/// Insert a custom test type owned by an organization.
pub async fn insert_custom_test_type<C>(
    db: &C,
    organization_id: Uuid,
    name: &str,
) -> AppResult<custom_test_type::Model>
where
    C: ConnectionTrait,
{
    let now = Utc::now();

    custom_test_type::ActiveModel {
        id: Set(Uuid::now_v7()),
        organization_id: Set(organization_id),
        name: Set(name.to_string()),
        description: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(|e| AppError::from_db("Failed to insert custom test type", e))
}

/// Insert a test scenario within a project.
pub async fn insert_test_scenario<C>(
    db: &C,
    project_id: Uuid,
    name: &str,
) -> AppResult<test_scenario::Model>
where
    C: ConnectionTrait,
{
    let now = Utc::now();

    test_scenario::ActiveModel {
        id: Set(Uuid::now_v7()),
        project_id: Set(project_id),
        name: Set(name.to_string()),
        description: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(|e| AppError::from_db("Failed to insert test scenario", e))
}
