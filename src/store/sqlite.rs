//! SQLite connection handling for the relational repositories.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use super::StoreError;

/// Open a SQLite pool with foreign keys enabled.
///
/// The database file is created if missing. In-memory URLs get a single
/// connection, since every SQLite connection opens its own private memory
/// database. `acquire_timeout` bounds how long a caller waits for a
/// connection.
pub async fn connect(url: &str, acquire_timeout: Duration) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let max_connections = if is_memory_url(url) { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    tracing::debug!(url, max_connections, "sqlite pool ready");
    Ok(pool)
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Microseconds since the epoch, the on-disk timestamp format.
pub(crate) fn to_micros(at: &chrono::DateTime<chrono::Utc>) -> i64 {
    at.timestamp_micros()
}

pub(crate) fn from_micros(micros: i64) -> Result<chrono::DateTime<chrono::Utc>, StoreError> {
    chrono::DateTime::<chrono::Utc>::from_timestamp_micros(micros)
        .ok_or_else(|| StoreError::corrupt(format!("timestamp out of range: {}", micros)))
}

pub(crate) fn parse_decimal(raw: &str) -> Result<rust_decimal::Decimal, StoreError> {
    rust_decimal::Decimal::from_str(raw)
        .map_err(|e| StoreError::corrupt(format!("bad decimal {:?}: {}", raw, e)))
}
