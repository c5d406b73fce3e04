//! Migration: Create projects and project_users tables.
//!
//! `test_case_sequence` is the per-project counter handed out by the
//! sequence allocator under a row lock.

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
                CREATE TABLE projects (
                    id UUID PRIMARY KEY,
                    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
                    name VARCHAR(255) NOT NULL,
                    prefix VARCHAR(10) NOT NULL,

                    -- Last issued test case number (0 = none issued yet)
                    test_case_sequence INTEGER NOT NULL DEFAULT 0
                        CHECK (test_case_sequence >= 0),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_projects_organization_id ON projects(organization_id);

                CREATE TABLE project_users (
                    id UUID PRIMARY KEY,
                    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    role VARCHAR(20) NOT NULL DEFAULT 'member'
                        CHECK (role IN ('admin', 'member', 'developer')),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- One membership per user per project
                CREATE UNIQUE INDEX idx_project_users_project_user
                    ON project_users(project_id, user_id);

                CREATE TRIGGER update_projects_updated_at
                    BEFORE UPDATE ON projects
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
                DROP TRIGGER IF EXISTS update_projects_updated_at ON projects;
                DROP TABLE IF EXISTS project_users CASCADE;
                DROP TABLE IF EXISTS projects CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
