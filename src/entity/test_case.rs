//! TestCase entity for SeaORM.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_cases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    /// Assigned once from the project counter, never reused
    pub project_sequence_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub steps: String,
    #[sea_orm(column_type = "Text")]
    pub expected_result: String,
    pub status: String,
    pub priority: String,
    /// Set XOR `custom_test_type_id` (CHECK constraint)
    pub test_type: Option<String>,
    pub custom_test_type_id: Option<Uuid>,
    pub test_scenario_id: Option<Uuid>,
    pub created_by_id: Uuid,
    pub responsible_id: Option<Uuid>,
    pub bug_responsible_id: Option<Uuid>,
    pub estimated_time: Option<String>,
    pub task_link: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub attachments: Option<JsonValue>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
    #[sea_orm(has_many = "super::script::Entity")]
    Scripts,
    #[sea_orm(has_many = "super::bug::Entity")]
    Bugs,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::script::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scripts.def()
    }
}

impl Related<super::bug::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bugs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
