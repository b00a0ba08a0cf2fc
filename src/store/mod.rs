//! Store - storage backends shared by the order and payment repositories.
//!
//! Two backends exist:
//!
//! - [`MemoryTable`]: a lock-guarded, insertion-ordered table used by the
//!   in-memory repositories (tests, local runs);
//! - [`sqlite`] (requires the `sqlite` feature): a `SqlitePool` opened with
//!   foreign keys enabled, used by the relational repositories.
//!
//! Services never await a repository directly; every call goes through
//! [`bounded`] so a stalled store surfaces as [`StoreError::Timeout`]
//! instead of hanging the request.

mod error;
mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::future::Future;
use std::time::Duration;

pub use error::StoreError;
pub use memory::{MemoryTable, Record};

/// Default bound on a single store round-trip.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Run a store operation, failing with [`StoreError::Timeout`] when it takes
/// longer than `limit`.
pub async fn bounded<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, limit_ms = limit.as_millis() as u64, "store call timed out");
            Err(StoreError::Timeout {
                operation,
                after_ms: limit.as_millis() as u64,
            })
        }
    }
}
