//! MemoryTable - HashMap-backed table for the in-memory repositories.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::StoreError;

/// A row type that can live in a [`MemoryTable`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Table name, used in error messages (e.g. "orders", "payments").
    const TABLE: &'static str;

    /// Primary key of this row.
    fn key(&self) -> String;
}

struct StoredRow<T> {
    row: T,
    seq: u64,
}

struct Rows<T> {
    by_key: HashMap<String, StoredRow<T>>,
    next_seq: u64,
}

/// In-memory table keyed by [`Record::key`].
///
/// Every row remembers its insertion sequence so scans come back in the order
/// rows were written. Clone-friendly via Arc: clones share the same rows.
pub struct MemoryTable<T> {
    rows: Arc<RwLock<Rows<T>>>,
}

impl<T> Clone for MemoryTable<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T: Record> Default for MemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> MemoryTable<T> {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Rows {
                by_key: HashMap::new(),
                next_seq: 0,
            })),
        }
    }

    /// Insert a new row. Fails with `Conflict` if the key is taken.
    pub fn insert(&self, row: T) -> Result<(), StoreError> {
        let key = row.key();
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::LockPoisoned("insert"))?;

        if rows.by_key.contains_key(&key) {
            return Err(StoreError::Conflict { table: T::TABLE, id: key });
        }

        let seq = rows.next_seq;
        rows.next_seq += 1;
        rows.by_key.insert(key, StoredRow { row, seq });
        Ok(())
    }

    /// Get a row by key.
    pub fn get(&self, key: &str) -> Result<Option<T>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned("get"))?;
        Ok(rows.by_key.get(key).map(|stored| stored.row.clone()))
    }

    /// Mutate a row in place. Returns `None` when no row has this key.
    pub fn update<R>(&self, key: &str, apply: impl FnOnce(&mut T) -> R) -> Result<Option<R>, StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::LockPoisoned("update"))?;
        Ok(rows.by_key.get_mut(key).map(|stored| apply(&mut stored.row)))
    }

    /// All rows matching a predicate, in insertion order.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Result<Vec<T>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned("find"))?;
        let mut matched: Vec<&StoredRow<T>> = rows
            .by_key
            .values()
            .filter(|stored| predicate(&stored.row))
            .collect();
        matched.sort_by_key(|stored| stored.seq);
        Ok(matched.into_iter().map(|stored| stored.row.clone()).collect())
    }

    /// Number of rows in the table.
    pub fn len(&self) -> Result<usize, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned("len"))?;
        Ok(rows.by_key.len())
    }
}
