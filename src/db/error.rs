use sea_orm::DbErr;
use thiserror::Error;

/// Startup failures of the todo store. Both are fatal for the process.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to database: {0}")]
    Connection(#[source] DbErr),
    #[error("failed to create schema: {0}")]
    Schema(#[source] DbErr),
}
