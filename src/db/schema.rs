use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::info;

use super::StoreError;

/// Store-side clock, millisecond precision, ISO-8601 UTC.
///
/// Text in this shape sorts lexically in chronological order, and SQLite
/// evaluates `'now'` once per statement, so every column stamped by one
/// statement gets the same value.
pub const STORE_NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

fn statements() -> [String; 3] {
    [
        format!(
            "CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                completed BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT ({STORE_NOW}),
                updated_at TEXT NOT NULL DEFAULT ({STORE_NOW})
            )"
        ),
        "CREATE INDEX IF NOT EXISTS idx_todos_completed ON todos(completed)".to_string(),
        "CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos(created_at)".to_string(),
    ]
}

/// Creates the `todos` table and its indexes when missing. Safe to run on
/// every start.
pub async fn initialize(db: &DatabaseConnection) -> Result<(), StoreError> {
    for statement in statements() {
        db.execute_unprepared(&statement)
            .await
            .map_err(StoreError::Schema)?;
    }
    info!("todo schema ready");
    Ok(())
}
