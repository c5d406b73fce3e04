//! Organization entity for SeaORM.
//!
//! Organizations are managed elsewhere; the engine only reads them to scope
//! custom test types.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project::Entity")]
    Projects,
    #[sea_orm(has_many = "super::custom_test_type::Entity")]
    CustomTestTypes,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::custom_test_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomTestTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
