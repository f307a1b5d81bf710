//! Client code for vitis.
//!
//! This crate provides the HTTP fetcher and the HTML table extractor that
//! feed the core pipeline with the external export dataset.

pub mod extract;
pub mod fetch;

pub use extract::{AmountError, TradeTableExtractor, parse_amount};

pub use fetch::{FetchClient, FetchConfig, FetchResponse, HttpSource, UrlError, parse_source_url};
