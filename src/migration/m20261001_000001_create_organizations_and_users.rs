//! Migration: Create organizations and users tables.
//!
//! Both are owned by external CRUD services; the engine reads them to resolve
//! references and notification recipients.

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
                -- Function to update updated_at timestamp
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;

                CREATE TABLE organizations (
                    id UUID PRIMARY KEY,
                    name VARCHAR(255) NOT NULL,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TABLE users (
                    id UUID PRIMARY KEY,
                    name VARCHAR(255) NOT NULL,
                    email VARCHAR(255) NOT NULL,
                    active BOOLEAN NOT NULL DEFAULT TRUE,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE UNIQUE INDEX idx_users_email ON users(email);

                CREATE TRIGGER update_organizations_updated_at
                    BEFORE UPDATE ON organizations
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TRIGGER update_users_updated_at
                    BEFORE UPDATE ON users
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
                DROP TRIGGER IF EXISTS update_users_updated_at ON users;
                DROP TRIGGER IF EXISTS update_organizations_updated_at ON organizations;
                DROP TABLE IF EXISTS users CASCADE;
                DROP TABLE IF EXISTS organizations CASCADE;
                DROP FUNCTION IF EXISTS update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }
}
