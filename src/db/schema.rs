//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL)
        .execute(pool)
        .await?;

    Ok(())
}

// uploaded_at uses the same millisecond RFC3339 layout the store writes,
// so ordering by the text column orders by time.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS packages (
    id TEXT PRIMARY KEY,
    file_data TEXT NOT NULL,
    uploaded_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_packages_uploaded_at ON packages(uploaded_at);
"#;
