//! Page requests, page results and the paginator.
//!
//! Pagination is offset-based: page `n` of size `s` is the slice
//! `[(n-1)*s, n*s)` of the candidate sequence, clipped to its bounds.
//! A page past the end is empty, not an error.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::record::Record;

/// Prefix shared by every cached page key.
pub const CACHE_KEY_PREFIX: &str = "exportacao";

/// A validated `(page, size)` pair. Both values are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    size: u64,
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> Result<Self, Error> {
        if page == 0 {
            return Err(Error::InvalidInput("page must be at least 1".into()));
        }
        if size == 0 {
            return Err(Error::InvalidInput("size must be at least 1".into()));
        }
        Ok(Self { page, size })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Offset of the first item on this page.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size)
    }

    /// Cache key for this request, e.g. `exportacao:2:10`.
    pub fn cache_key(&self) -> String {
        format!("{CACHE_KEY_PREFIX}:{}:{}", self.page, self.size)
    }
}

/// A page of records as returned to clients and stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageResult {
    pub items: Vec<Record>,
    /// Number of candidate records this page was cut from.
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub page: u64,
}

/// Slice `records` into the requested page.
///
/// `total` and `total_pages` always describe the whole input, whether or not
/// the requested page falls inside it.
pub fn paginate(records: &[Record], request: PageRequest) -> PageResult {
    let total = records.len() as u64;
    let skip = request.skip();
    let limit = request.size();

    let items = if skip >= total {
        Vec::new()
    } else {
        let start = skip as usize;
        let end = skip.saturating_add(limit).min(total) as usize;
        records[start..end].to_vec()
    };

    PageResult { items, total, skip, limit, total_pages: total.div_ceil(limit), page: request.page() }
}
