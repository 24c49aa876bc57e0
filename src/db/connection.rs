use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::{debug, info};

use super::StoreError;
use crate::config::DatabaseConfig;

const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
// An in-memory database lives exactly as long as its connection.
const IN_MEMORY_KEEPALIVE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PoolSettings {
    max_connections: u32,
    min_idle: u32,
    /// Overrides the pool's idle timeout and max lifetime when set.
    keepalive: Option<Duration>,
}

impl PoolSettings {
    fn for_config(cfg: &DatabaseConfig) -> Self {
        if cfg.is_in_memory() {
            Self {
                max_connections: 1,
                min_idle: 1,
                keepalive: Some(IN_MEMORY_KEEPALIVE),
            }
        } else {
            Self {
                max_connections: cfg.max_connections,
                min_idle: cfg.min_idle,
                keepalive: None,
            }
        }
    }
}

/// Opens the pooled store and verifies it answers before handing it out.
pub async fn connect(cfg: &DatabaseConfig) -> Result<DatabaseConnection, StoreError> {
    let pool = PoolSettings::for_config(cfg);

    let mut options = ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(pool.max_connections)
        .min_connections(pool.min_idle)
        .connect_timeout(CONNECT_TIMEOUT)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .sqlx_logging(false);
    if let Some(keepalive) = pool.keepalive {
        options.idle_timeout(keepalive).max_lifetime(keepalive);
    }

    let db = Database::connect(options)
        .await
        .map_err(StoreError::Connection)?;
    post_connect(&db).await.map_err(StoreError::Connection)?;
    db.ping().await.map_err(StoreError::Connection)?;

    info!(max_connections = pool.max_connections, "connected to todo store");
    Ok(db)
}

async fn post_connect(db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
    db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
    db.execute_unprepared(&format!("PRAGMA busy_timeout = {SQLITE_BUSY_TIMEOUT_MS}"))
        .await?;
    Ok(())
}

/// Releases every pooled connection. Consumes the handle.
pub async fn close(db: DatabaseConnection) -> Result<(), StoreError> {
    db.close().await.map_err(StoreError::Connection)?;
    debug!("todo store closed");
    Ok(())
}
