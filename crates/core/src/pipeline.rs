//! Read-through page cache over the fetch, extract and ingest pipeline.
//!
//! A request for `(page, size)` is answered from the page cache when a fresh
//! entry exists. Otherwise the full dataset is fetched, extracted, ingested
//! into the record store and paginated, and the page is cached on the way out.
//!
//! Pagination always runs over the freshly fetched candidates, never over the
//! store: the store is a dedup sink, so `total` reflects the latest fetch.
//! The cache is written last, only after every earlier step succeeded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::Error;
use crate::adapters::{CacheLookup, Extractor, Fetcher, PageCache};
use crate::ingest::IngestEngine;
use crate::page::{PageRequest, PageResult, paginate};

/// Timeouts and cache lifetime for page requests.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub fetch_timeout: Duration,
    pub store_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(20),
            store_timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

impl From<&crate::config::AppConfig> for PipelineSettings {
    fn from(config: &crate::config::AppConfig) -> Self {
        Self {
            fetch_timeout: config.fetch_timeout(),
            store_timeout: config.store_timeout(),
            cache_ttl: config.cache_ttl(),
        }
    }
}

/// Serves export data pages. Sole writer of the page cache.
#[derive(Clone)]
pub struct ExportPages {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    engine: IngestEngine,
    cache: Arc<dyn PageCache>,
    settings: PipelineSettings,
}

impl ExportPages {
    pub fn new(
        fetcher: Arc<dyn Fetcher>, extractor: Arc<dyn Extractor>, engine: IngestEngine, cache: Arc<dyn PageCache>,
        settings: PipelineSettings,
    ) -> Self {
        Self { fetcher, extractor, engine, cache, settings }
    }

    /// Return the requested page, from cache when possible.
    ///
    /// # Errors
    ///
    /// - `Error::Upstream` when fetching or extracting the dataset fails
    /// - `Error::Store` when the records could not be persisted
    ///
    /// Neither case writes to the cache. A failed cache write is logged and
    /// the computed page is returned anyway.
    pub async fn get_page(&self, request: PageRequest) -> Result<PageResult, Error> {
        let key = request.cache_key();

        if let Some(page) = self.cached(&key).await {
            tracing::debug!(%key, "page cache hit");
            return Ok(page);
        }
        tracing::debug!(%key, "page cache miss");

        let started = Instant::now();
        let raw = tokio::time::timeout(self.settings.fetch_timeout, self.fetcher.fetch_raw())
            .await
            .map_err(|_| {
                Error::FetchTimeout(format!("{} exceeded {:?}", self.fetcher.describe(), self.settings.fetch_timeout))
            })
            .and_then(|r| r)
            .map_err(|e| Error::Upstream { operation: "fetch", key: key.clone(), source: Box::new(e) })?;
        let fetch_ms = started.elapsed().as_millis() as u64;

        let records = self
            .extractor
            .extract(&raw)
            .map_err(|e| Error::Upstream { operation: "extract", key: key.clone(), source: Box::new(e) })?;

        let report = self
            .engine
            .ingest(&records)
            .await
            .map_err(|e| Error::Store { operation: "ingest", key: key.clone(), source: Box::new(e) })?;

        let page = paginate(&records, request);

        tracing::info!(
            %key,
            source = %self.fetcher.describe(),
            fetch_ms,
            candidates = records.len(),
            inserted = report.inserted,
            items = page.items.len(),
            "computed page"
        );

        if let Err(e) = self.store_page(&key, &page).await {
            tracing::warn!(%key, error = %e, "failed to cache page");
        }

        Ok(page)
    }

    /// Fresh cached page for `key`; read failures count as misses.
    async fn cached(&self, key: &str) -> Option<PageResult> {
        let lookup = match tokio::time::timeout(self.settings.store_timeout, self.cache.get(key)).await {
            Ok(Ok(lookup)) => lookup,
            Ok(Err(e)) => {
                tracing::warn!(%key, error = %e, "page cache read failed");
                return None;
            }
            Err(_) => {
                tracing::warn!(%key, timeout = ?self.settings.store_timeout, "page cache read timed out");
                return None;
            }
        };

        match lookup {
            CacheLookup::Hit(json) => match serde_json::from_str(&json) {
                Ok(page) => Some(page),
                Err(e) => {
                    tracing::warn!(%key, error = %e, "discarding undecodable cached page");
                    None
                }
            },
            CacheLookup::Miss => None,
        }
    }

    async fn store_page(&self, key: &str, page: &PageResult) -> Result<(), Error> {
        let wrap = |e: Error| Error::CacheWrite { key: key.to_string(), source: Box::new(e) };

        let json = serde_json::to_string(page).map_err(|e| wrap(e.into()))?;
        tokio::time::timeout(self.settings.store_timeout, self.cache.set(key, &json, self.settings.cache_ttl))
            .await
            .map_err(|_| wrap(Error::StoreTimeout(format!("cache write exceeded {:?}", self.settings.store_timeout))))?
            .map_err(wrap)
    }
}
