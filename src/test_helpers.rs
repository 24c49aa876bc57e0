use std::sync::Arc;

use axum::Router;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

use crate::{
    config::{AppConfig, DatabaseConfig},
    db::{connection, schema},
    routes::app,
    state::AppState,
};

/// Fresh in-memory store with the schema applied.
pub async fn memory_db() -> DatabaseConnection {
    let db = connection::connect(&DatabaseConfig::in_memory())
        .await
        .expect("open in-memory store");
    schema::initialize(&db).await.expect("initialize schema");
    db
}

pub fn test_state(db: DatabaseConnection) -> Arc<AppState> {
    let mut cfg = AppConfig::default();
    cfg.database = DatabaseConfig::in_memory();
    AppState::new(cfg, db)
}

/// Full middleware stack over a private in-memory store.
pub async fn test_app() -> Router {
    app(test_state(memory_db().await))
}

/// Mock store speaking the SQLite dialect.
pub fn mock_sqlite() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Sqlite)
}
