//! Migration: Create custom_test_types and test_scenarios tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE custom_test_types (
                    id UUID PRIMARY KEY,
                    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
                    name VARCHAR(255) NOT NULL,
                    description TEXT,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Names are unique within an organization
                CREATE UNIQUE INDEX idx_custom_test_types_org_name
                    ON custom_test_types(organization_id, name);

                CREATE TABLE test_scenarios (
                    id UUID PRIMARY KEY,
                    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                    name VARCHAR(255) NOT NULL,
                    description TEXT,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_test_scenarios_project_id ON test_scenarios(project_id);

                CREATE TRIGGER update_custom_test_types_updated_at
                    BEFORE UPDATE ON custom_test_types
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TRIGGER update_test_scenarios_updated_at
                    BEFORE UPDATE ON test_scenarios
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_test_scenarios_updated_at ON test_scenarios;
                DROP TRIGGER IF EXISTS update_custom_test_types_updated_at ON custom_test_types;
                DROP TABLE IF EXISTS test_scenarios CASCADE;
                DROP TABLE IF EXISTS custom_test_types CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
