//! MCP tool implementations.
//!
//! This module contains all tools exposed by the vitis server.

pub mod cache;
pub mod exportacao;
pub mod store_stats;

#[cfg(test)]
pub(crate) mod test_support;

pub use exportacao::{ExportPageParams, page_impl};
pub use store_stats::stats_impl;
