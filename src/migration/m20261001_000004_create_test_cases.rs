//! Migration: Create test_cases table.
//!
//! One test case per row, numbered from its project's counter.

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
                CREATE TABLE test_cases (
                    id UUID PRIMARY KEY, -- UUIDv7 for time-ordered sorting
                    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                    project_sequence_id INTEGER NOT NULL CHECK (project_sequence_id > 0),

                    -- Content
                    title VARCHAR(255) NOT NULL,
                    description TEXT NOT NULL,
                    steps TEXT NOT NULL,
                    expected_result TEXT NOT NULL,

                    status VARCHAR(20) NOT NULL DEFAULT 'PENDING'
                        CHECK (status IN ('PENDING', 'IN_PROGRESS', 'APPROVED', 'REPROVED',
                                          'BLOCKED', 'FINISHED', 'CANCELED')),
                    priority VARCHAR(20) NOT NULL DEFAULT 'MEDIUM'
                        CHECK (priority IN ('NONE', 'LOW', 'MEDIUM', 'HIGH', 'CRITICAL')),

                    -- Exactly one of the fixed type or the organization-defined type
                    test_type VARCHAR(30),
                    custom_test_type_id UUID REFERENCES custom_test_types(id) ON DELETE RESTRICT,
                    CONSTRAINT chk_test_cases_single_type
                        CHECK ((test_type IS NULL) <> (custom_test_type_id IS NULL)),

                    test_scenario_id UUID REFERENCES test_scenarios(id) ON DELETE SET NULL,

                    -- People
                    created_by_id UUID NOT NULL REFERENCES users(id),
                    responsible_id UUID REFERENCES users(id) ON DELETE SET NULL,
                    bug_responsible_id UUID REFERENCES users(id) ON DELETE SET NULL,

                    estimated_time VARCHAR(50),
                    task_link VARCHAR(255),
                    attachments JSONB DEFAULT '[]'::jsonb,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Sequence numbers are unique per project
                CREATE UNIQUE INDEX idx_test_cases_project_sequence
                    ON test_cases(project_id, project_sequence_id);

                -- Index for status filtering within a project
                CREATE INDEX idx_test_cases_status ON test_cases(project_id, status);

                CREATE INDEX idx_test_cases_responsible_id ON test_cases(responsible_id)
                    WHERE responsible_id IS NOT NULL;

                CREATE TRIGGER update_test_cases_updated_at
                    BEFORE UPDATE ON test_cases
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
                DROP TRIGGER IF EXISTS update_test_cases_updated_at ON test_cases;
                DROP TABLE IF EXISTS test_cases CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
