//! Insert-if-absent writes and reads for trade records.

use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::params;

use super::connection::Db;
use super::timestamp;
use crate::Error;
use crate::adapters::{BatchOutcome, RecordStore, Upsert};
use crate::record::{Record, StoredRecord};

#[async_trait]
impl RecordStore for Db {
    /// Runs every upsert inside one transaction. A statement that fails is
    /// rolled back on its own, the rest of the batch still commits.
    async fn upsert_many(&self, batch: Vec<Upsert>) -> Result<BatchOutcome, Error> {
        if batch.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let attempted = batch.len();
        let inserted_at = timestamp(Utc::now());

        let (outcome, failures) = self
            .conn
            .call(move |conn| -> Result<(BatchOutcome, Vec<String>), Error> {
                let tx = conn.transaction()?;
                let mut outcome = BatchOutcome::default();
                let mut failures = Vec::new();
                {
                    let mut stmt = tx.prepare_cached(
                        "INSERT INTO export_records (country, quantity_kg, value_usd, document_json, inserted_at)
                        VALUES (?1, ?2, ?3, ?4, ?5)
                        ON CONFLICT(country, quantity_kg, value_usd) DO NOTHING",
                    )?;

                    for upsert in &batch {
                        let document = match serde_json::to_string(&upsert.record) {
                            Ok(d) => d,
                            Err(e) => {
                                failures.push(format!("{}: {e}", upsert.key));
                                continue;
                            }
                        };
                        let result = stmt.execute(params![
                            upsert.key.country,
                            upsert.key.quantity_kg,
                            upsert.key.value_usd,
                            document,
                            inserted_at,
                        ]);
                        match result {
                            Ok(0) => outcome.matched += 1,
                            Ok(_) => outcome.inserted += 1,
                            Err(e) => failures.push(format!("{}: {e}", upsert.key)),
                        }
                    }
                }
                tx.commit()?;
                Ok((outcome, failures))
            })
            .await
            .map_err(Error::from)?;

        tracing::debug!(
            attempted,
            inserted = outcome.inserted,
            matched = outcome.matched,
            failed = failures.len(),
            "applied upsert batch"
        );

        match failures.first() {
            None => Ok(outcome),
            Some(first) => {
                tracing::warn!(attempted, failed = failures.len(), first_error = %first, "upsert batch partially failed");
                Err(Error::BatchWrite { attempted, failed: failures.len(), first_error: first.clone() })
            }
        }
    }
}

impl Db {
    /// All stored records in insertion order.
    pub async fn list_records(&self) -> Result<Vec<StoredRecord>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoredRecord>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT country, quantity_kg, value_usd, document_json, inserted_at
                    FROM export_records ORDER BY id ASC",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok(StoredRecord {
                        record: Record { country: row.get(0)?, quantity_kg: row.get(1)?, value_usd: row.get(2)? },
                        document: row.get(3)?,
                        inserted_at: row.get(4)?,
                    })
                })?;
                let records = rows.collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of distinct records held by the store.
    pub async fn count_records(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM export_records", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
