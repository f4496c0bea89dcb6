//! Database layer for ScholarDemon
//!
//! Provides:
//! - SeaORM entity models
//! - Typed predicate builder and pagination for read views
//! - Repository for data access
//! - Connection pool lifecycle and migrations

pub mod comment_tree;
pub mod models;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod views;

pub use pagination::{PageRequest, Paginated, Pagination};
pub use repository::Repository;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Database connection pool wrapper
///
/// Connections are shared behind `Arc`: `DatabaseConnection` is not `Clone`
/// once sea-orm's mock backend is enabled.
#[derive(Clone)]
pub struct DbPool {
    /// Primary connection (for writes)
    primary: Arc<DatabaseConnection>,

    /// Read replica connection (optional)
    replica: Option<Arc<DatabaseConnection>>,
}

fn connect_options(url: &str, config: &DatabaseConfig) -> ConnectOptions {
    let mut opts = ConnectOptions::new(url);
    opts.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .sqlx_logging(true);
    opts
}

impl DbPool {
    /// Open the primary pool and, when configured, the read replica
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to primary database...");

        let primary = Database::connect(connect_options(&config.url, config))
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect to primary: {}", e),
            })?;

        let replica = match config.read_url {
            Some(ref read_url) => {
                info!("Connecting to read replica...");

                let conn = Database::connect(connect_options(read_url, config))
                    .await
                    .map_err(|e| AppError::DatabaseConnection {
                        message: format!("Failed to connect to replica: {}", e),
                    })?;
                Some(conn)
            }
            None => None,
        };

        info!("Database connections established");

        Ok(Self {
            primary: Arc::new(primary),
            replica: replica.map(Arc::new),
        })
    }

    /// Wrap an existing connection, used by tests and tools
    pub fn from_connection(primary: DatabaseConnection) -> Self {
        Self {
            primary: Arc::new(primary),
            replica: None,
        }
    }

    /// Get the connection for reads (replica if available, otherwise primary)
    pub fn read(&self) -> &DatabaseConnection {
        self.replica.as_deref().unwrap_or(self.primary.as_ref())
    }

    /// Get the connection for writes (always primary)
    pub fn write(&self) -> &DatabaseConnection {
        &self.primary
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.primary
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Primary ping failed: {}", e),
            })?;

        if let Some(ref replica) = self.replica {
            replica
                .execute_unprepared("SELECT 1")
                .await
                .map_err(|e| AppError::DatabaseConnection {
                    message: format!("Replica ping failed: {}", e),
                })?;
        }

        Ok(())
    }

    /// Apply pending migrations from `migrations/` on the primary
    pub async fn migrate(&self) -> Result<()> {
        info!("Applying database migrations...");

        sqlx::migrate!("../../migrations")
            .run(self.primary.get_postgres_connection_pool())
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Migration failed: {}", e),
            })?;

        info!("Database migrations applied");
        Ok(())
    }

    /// Close every pool; in-flight queries finish first
    pub async fn close(self) -> Result<()> {
        if let Some(replica) = self.replica {
            close_connection(replica, "replica").await?;
        }
        close_connection(self.primary, "primary").await?;

        info!("Database connections closed");
        Ok(())
    }
}

async fn close_connection(conn: Arc<DatabaseConnection>, label: &str) -> Result<()> {
    match Arc::try_unwrap(conn) {
        Ok(conn) => conn.close().await.map_err(AppError::Database),
        Err(shared) => {
            // Another clone is still alive; closing the sqlx pool works by reference.
            warn!(connection = label, "Pool still shared at shutdown, closing underlying pool");
            if let DatabaseConnection::SqlxPostgresPoolConnection(_) = shared.as_ref() {
                shared.get_postgres_connection_pool().close().await;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn mock_pool() -> DbPool {
        DbPool::from_connection(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    #[test]
    fn test_reads_fall_back_to_primary() {
        let pool = mock_pool();
        assert!(std::ptr::eq(pool.read(), pool.write()));
    }

    #[tokio::test]
    async fn test_close_with_live_clone() {
        let pool = mock_pool();
        let state_copy = pool.clone();

        assert!(pool.close().await.is_ok());
        assert!(state_copy.close().await.is_ok());
    }
}
