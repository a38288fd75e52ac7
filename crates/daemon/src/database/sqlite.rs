use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use super::DatabaseSetupError;

const MEMORY_MARKER: &str = ":memory:";

pub async fn connect_sqlite(url: &url::Url) -> Result<SqlitePool, DatabaseSetupError> {
    let in_memory = url.as_str().contains(MEMORY_MARKER);

    let options = SqliteConnectOptions::from_str(url.as_str())?
        .create_if_missing(true)
        .foreign_keys(true);

    // every connection to :memory: opens its own database, so the pool
    // must never hold more than one
    let pool = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options.journal_mode(SqliteJournalMode::Wal))
            .await?
    };

    sqlx::query("SELECT 1").execute(&pool).await?;
    tracing::debug!(in_memory, "connected to sqlite");
    Ok(pool)
}

pub async fn migrate_sqlite(pool: &SqlitePool) -> Result<(), DatabaseSetupError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
