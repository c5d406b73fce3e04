//! Database module providing connection management, migrations, and queries.
//!
//! Functions that take a generic `ConnectionTrait` run equally on the pool or
//! inside a `DatabaseTransaction`; the lifecycle engine relies on that to keep
//! every mutation of one request in a single transaction.

pub mod bugs;
pub mod catalog;
pub mod notifications;
pub mod projects;
pub mod scripts;
pub mod test_cases;
pub mod users;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use sea_orm_migration::MigratorTrait;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

/// Database connection pool wrapper.
/// `DatabaseConnection` is internally pooled and cheap to clone.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to PostgreSQL using the configured pool settings.
    pub async fn new(config: &Config) -> AppResult<Self> {
        let settings = &config.database;
        if !settings.url.starts_with("postgres://") && !settings.url.starts_with("postgresql://") {
            return Err(AppError::Database(
                "Invalid DATABASE_URL format. Expected 'postgres://...'".to_string(),
            ));
        }

        let mut options = ConnectOptions::new(settings.url.clone());
        options
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Get access to the connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Open a transaction; it rolls back on drop unless committed.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.conn
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))
    }

    /// Apply pending migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Failed to run migrations: {}", e)))
    }
}
