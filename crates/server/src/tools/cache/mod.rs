//! Cache-related MCP tools.
//!
//! This module provides maintenance tools for the SQLite page cache.

pub mod purge;

pub use purge::purge_impl;
