//! Row id allocation
//!
//! Row ids are unique per (database, collection, doc part path) and strictly
//! increasing. Translators running on different threads share one allocator,
//! so allocation is a single atomic increment on a per-key counter.
//!
//! The first id handed out for a fresh key is 1. Storage layers that reload
//! existing rows seed each counter with the largest id they found
//! ([`SequenceAllocator::seed`]).

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tessera_core::{Error, NestingPath, Result, RowId};
use tracing::trace;

/// Source of row ids
///
/// Thread safety: implementations are shared between concurrent translators
/// (requires Send + Sync) and must never hand out the same id twice for the
/// same key.
pub trait RowIdAllocator: Send + Sync {
    /// Next row id for the doc part at `path`
    fn next_row_id(&self, database: &str, collection: &str, path: &NestingPath) -> Result<RowId>;
}

/// Counter key: one sequence per doc part
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AllocatorKey {
    /// Database name
    pub database: String,
    /// Collection name
    pub collection: String,
    /// Doc part path
    pub path: NestingPath,
}

impl AllocatorKey {
    /// Create a key
    pub fn new(database: impl Into<String>, collection: impl Into<String>, path: NestingPath) -> Self {
        AllocatorKey {
            database: database.into(),
            collection: collection.into(),
            path,
        }
    }
}

/// In-memory allocator backed by one atomic counter per key
#[derive(Debug, Default)]
pub struct SequenceAllocator {
    counters: DashMap<AllocatorKey, AtomicU64>,
}

impl SequenceAllocator {
    /// Create an allocator with no counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise a counter so the next id is greater than `last_used`
    ///
    /// Never lowers a counter.
    pub fn seed(&self, key: AllocatorKey, last_used: RowId) {
        self.counters
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_max(last_used, Ordering::SeqCst);
    }

    /// Last id handed out (or seeded) for a key; 0 if none
    pub fn last_used(&self, database: &str, collection: &str, path: &NestingPath) -> RowId {
        let key = AllocatorKey::new(database, collection, path.clone());
        self.counters
            .get(&key)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Number of keys with a counter
    pub fn key_count(&self) -> usize {
        self.counters.len()
    }
}

impl RowIdAllocator for SequenceAllocator {
    fn next_row_id(&self, database: &str, collection: &str, path: &NestingPath) -> Result<RowId> {
        let key = AllocatorKey::new(database, collection, path.clone());
        // Fast path: existing counter, shared shard lock only
        if let Some(counter) = self.counters.get(&key) {
            return bump(&counter);
        }
        let counter = self
            .counters
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0));
        let id = bump(&counter)?;
        trace!(target: "tessera::metainf", %database, %collection, doc_part = %path, id, "Started row id sequence");
        Ok(id)
    }
}

fn bump(counter: &AtomicU64) -> Result<RowId> {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_add(1))
        .map(|previous| previous + 1)
        .map_err(|_| Error::Allocator("row id space exhausted".to_string()))
}
