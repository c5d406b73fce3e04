//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_organizations_and_users;
mod m20261001_000002_create_projects;
mod m20261001_000003_create_test_catalog;
mod m20261001_000004_create_test_cases;
mod m20261001_000005_create_scripts;
mod m20261001_000006_create_notifications_and_bugs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_organizations_and_users::Migration),
            Box::new(m20261001_000002_create_projects::Migration),
            Box::new(m20261001_000003_create_test_catalog::Migration),
            Box::new(m20261001_000004_create_test_cases::Migration),
            Box::new(m20261001_000005_create_scripts::Migration),
            Box::new(m20261001_000006_create_notifications_and_bugs::Migration),
        ]
    }
}
