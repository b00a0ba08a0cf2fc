/// Errors raised by the storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{table} not found: {id}")]
    NotFound { table: &'static str, id: String },

    #[error("{table} already exists: {id}")]
    Conflict { table: &'static str, id: String },

    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("{operation} timed out after {after_ms}ms")]
    Timeout {
        operation: &'static str,
        after_ms: u64,
    },

    #[cfg(feature = "sqlite")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub(crate) fn not_found(table: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            table,
            id: id.to_string(),
        }
    }

    pub(crate) fn corrupt(what: impl std::fmt::Display) -> Self {
        StoreError::Corrupt(what.to_string())
    }
}
