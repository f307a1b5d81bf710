//! Capability traits the pipeline is written against.
//!
//! The record store and page cache are injected as `Arc<dyn _>` handles built
//! once at startup and shared by every request. The fetcher and extractor
//! stand in for the external data source.

use std::time::Duration;

use async_trait::async_trait;

use crate::Error;
use crate::record::{Record, RecordKey};

/// One idempotent write: insert `record` unless an entry with `key` exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Upsert {
    pub key: RecordKey,
    pub record: Record,
}

/// Per-batch counts reported by a record store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Keys that were not present and got inserted.
    pub inserted: usize,
    /// Keys already present, left untouched.
    pub matched: usize,
}

/// Persistent collection with insert-if-absent semantics.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Apply every upsert in `batch`, in no particular order.
    ///
    /// A failing upsert must not stop the others from being attempted. When
    /// any of them fails the whole call fails with one aggregate error.
    async fn upsert_many(&self, batch: Vec<Upsert>) -> Result<BatchOutcome, Error>;
}

/// Result of a cache lookup.
///
/// A hit carries the stored value even when that value is an empty page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(String),
    Miss,
}

/// Key-value cache for serialized pages.
#[async_trait]
pub trait PageCache: Send + Sync {
    /// Look up a fresh entry; expired entries are misses.
    async fn get(&self, key: &str) -> Result<CacheLookup, Error>;

    /// Store `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error>;
}

/// External source of the raw dataset.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download the full raw payload.
    async fn fetch_raw(&self) -> Result<String, Error>;

    /// Human-readable name of the source, used in logs and error context.
    fn describe(&self) -> String;
}

/// Turns a raw payload into candidate records.
pub trait Extractor: Send + Sync {
    fn extract(&self, raw: &str) -> Result<Vec<Record>, Error>;
}
