//! SQLite-backed record store and page cache.
//!
//! One database file holds two tables:
//!
//! - `export_records`: deduplicated trade records, unique on
//!   `(country, quantity_kg, value_usd)`, written insert-if-absent
//! - `page_cache`: serialized pages keyed by `exportacao:{page}:{size}`,
//!   each with an expiry
//!
//! Access goes through tokio-rusqlite, so every statement runs on the
//! connection's background thread. Schema changes are versioned migrations.

pub mod connection;
pub mod migrations;
pub mod page_cache;
pub mod records;

pub use crate::Error;

pub use connection::Db;

use std::time::Duration;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

/// Latest instant the fixed-width format can hold.
pub(crate) const MAX_TIMESTAMP: &str = "9999-12-31T23:59:59.999999Z";

/// Fixed-width RFC 3339 timestamp; string order matches time order.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Timestamp of `at + ttl`, saturating at `MAX_TIMESTAMP`.
pub(crate) fn expiry(at: DateTime<Utc>, ttl: Duration) -> String {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| at.checked_add_signed(ttl))
        .filter(|expires| expires.year() <= 9999)
        .map_or_else(|| MAX_TIMESTAMP.to_string(), timestamp)
}
