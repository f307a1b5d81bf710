//! Page cache operations.
//!
//! Entries are replaced wholesale on write and carry their own expiry.
//! Reads ignore expired rows; `purge_expired_pages` removes them.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::params;

use super::connection::Db;
use super::{expiry, timestamp};
use crate::Error;
use crate::adapters::{CacheLookup, PageCache};

/// Cached page metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCacheMeta {
    pub cache_key: String,
    pub cached_at: String,
    pub expires_at: String,
}

#[async_trait]
impl PageCache for Db {
    async fn get(&self, key: &str) -> Result<CacheLookup, Error> {
        let key = key.to_string();
        let now = timestamp(Utc::now());
        self.conn
            .call(move |conn| -> Result<CacheLookup, Error> {
                let mut stmt =
                    conn.prepare("SELECT page_json FROM page_cache WHERE cache_key = ?1 AND expires_at > ?2")?;

                let result = stmt.query_row(params![key, now], |row| row.get(0));

                match result {
                    Ok(json) => Ok(CacheLookup::Hit(json)),
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => Ok(CacheLookup::Miss),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error> {
        let key = key.to_string();
        let value = value.to_string();

        let now = Utc::now();
        let cached_at = timestamp(now);
        let expires_at = expiry(now, ttl);

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO page_cache (cache_key, page_json, cached_at, expires_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(cache_key) DO UPDATE SET
                        page_json = excluded.page_json,
                        cached_at = excluded.cached_at,
                        expires_at = excluded.expires_at",
                    params![key, value, cached_at, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

impl Db {
    /// Get cache metadata for a key, expired or not.
    pub async fn get_page_meta(&self, key: &str) -> Result<Option<PageCacheMeta>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<PageCacheMeta>, Error> {
                let mut stmt =
                    conn.prepare("SELECT cache_key, cached_at, expires_at FROM page_cache WHERE cache_key = ?1")?;

                let result = stmt.query_row(params![key], |row| {
                    Ok(PageCacheMeta { cache_key: row.get(0)?, cached_at: row.get(1)?, expires_at: row.get(2)? })
                });

                match result {
                    Ok(meta) => Ok(Some(meta)),
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Delete expired page cache entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired_pages(&self) -> Result<u64, Error> {
        let now = timestamp(Utc::now());
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM page_cache WHERE expires_at <= ?1", params![now])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
