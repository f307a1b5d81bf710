//! Core types and shared functionality for vitis.
//!
//! This crate provides:
//! - Trade record model and offset pagination
//! - Ingestion engine with insert-if-absent dedup
//! - Read-through page cache pipeline
//! - SQLite record store and page cache
//! - Unified error types
//! - Configuration structures

pub mod adapters;
pub mod config;
pub mod error;
pub mod ingest;
pub mod page;
pub mod pipeline;
pub mod record;
pub mod store;

pub use adapters::{BatchOutcome, CacheLookup, Extractor, Fetcher, PageCache, RecordStore, Upsert};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use ingest::{IngestEngine, IngestReport};
pub use page::{PageRequest, PageResult, paginate};
pub use pipeline::{ExportPages, PipelineSettings};
pub use record::{Record, RecordKey, StoredRecord};
pub use store::Db;
