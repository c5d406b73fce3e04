//! Migration: Create notifications and bugs tables.
//!
//! Both are written after the lifecycle transaction commits.

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
                CREATE TABLE notifications (
                    id UUID PRIMARY KEY,
                    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    kind VARCHAR(40) NOT NULL
                        CHECK (kind IN ('TEST_CASE_FAILED', 'TEST_CASE_ASSIGNMENT')),
                    message TEXT NOT NULL,
                    link VARCHAR(500),
                    read BOOLEAN NOT NULL DEFAULT FALSE,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Inbox listing, newest first
                CREATE INDEX idx_notifications_user_created
                    ON notifications(user_id, created_at DESC);

                CREATE TABLE bugs (
                    id UUID PRIMARY KEY,
                    test_case_id UUID NOT NULL REFERENCES test_cases(id) ON DELETE CASCADE,
                    title VARCHAR(300) NOT NULL,
                    description TEXT NOT NULL,
                    steps TEXT,
                    expected_result TEXT,
                    status VARCHAR(20) NOT NULL DEFAULT 'OPEN'
                        CHECK (status IN ('OPEN', 'IN_PROGRESS', 'RESOLVED', 'CLOSED', 'REOPENED')),
                    priority VARCHAR(20) NOT NULL DEFAULT 'NONE'
                        CHECK (priority IN ('NONE', 'LOW', 'MEDIUM', 'HIGH', 'CRITICAL')),
                    assigned_developer_id UUID REFERENCES users(id) ON DELETE SET NULL,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_bugs_test_case_id ON bugs(test_case_id);

                CREATE TRIGGER update_bugs_updated_at
                    BEFORE UPDATE ON bugs
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
                DROP TRIGGER IF EXISTS update_bugs_updated_at ON bugs;
                DROP TABLE IF EXISTS bugs CASCADE;
                DROP TABLE IF EXISTS notifications CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
