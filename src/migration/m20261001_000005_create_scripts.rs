//! Migration: Create scripts table.
//!
//! Append-only script versions; only the status snapshot of the latest
//! version is ever rewritten.

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
                CREATE TABLE scripts (
                    id UUID PRIMARY KEY,
                    test_case_id UUID NOT NULL REFERENCES test_cases(id) ON DELETE CASCADE,
                    version INTEGER NOT NULL CHECK (version > 0),
                    script_path VARCHAR(1000) NOT NULL,

                    -- Status snapshot of the owning test case
                    status VARCHAR(20) NOT NULL,
                    status_set_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Version numbers are unique per test case
                CREATE UNIQUE INDEX idx_scripts_test_case_version
                    ON scripts(test_case_id, version);

                -- Index for project-wide listings ordered by recency
                CREATE INDEX idx_scripts_created_at ON scripts(created_at DESC);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS scripts CASCADE;")
            .await?;

        Ok(())
    }
}
