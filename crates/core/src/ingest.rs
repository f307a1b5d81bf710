//! Ingestion-dedup engine.
//!
//! Every candidate record becomes one insert-if-absent write keyed on
//! `(country, quantity_kg, value_usd)`. The writes go to the store as a single
//! unordered batch, so replaying the same candidates any number of times
//! leaves the store as a single application would.

use std::sync::Arc;
use std::time::Duration;

use crate::Error;
use crate::adapters::{RecordStore, Upsert};
use crate::record::Record;

/// Counts for one successful `ingest` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub submitted: usize,
    pub inserted: usize,
    pub unchanged: usize,
}

/// Sole writer of the record store.
#[derive(Clone)]
pub struct IngestEngine {
    store: Arc<dyn RecordStore>,
    timeout: Duration,
}

impl IngestEngine {
    pub fn new(store: Arc<dyn RecordStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Persist each distinct record at most once.
    ///
    /// # Errors
    ///
    /// Returns the store's aggregate error when any write fails, or
    /// `Error::StoreTimeout` when the batch does not finish in time. Neither
    /// says which records made it; the whole call is safe to retry.
    pub async fn ingest(&self, records: &[Record]) -> Result<IngestReport, Error> {
        if records.is_empty() {
            return Ok(IngestReport::default());
        }

        let batch: Vec<Upsert> = records
            .iter()
            .map(|record| Upsert { key: record.key(), record: record.clone() })
            .collect();
        let submitted = batch.len();

        let outcome = tokio::time::timeout(self.timeout, self.store.upsert_many(batch))
            .await
            .map_err(|_| Error::StoreTimeout(format!("upsert of {submitted} records exceeded {:?}", self.timeout)))??;

        tracing::info!(submitted, inserted = outcome.inserted, unchanged = outcome.matched, "ingested records");

        Ok(IngestReport { submitted, inserted: outcome.inserted, unchanged: outcome.matched })
    }
}
