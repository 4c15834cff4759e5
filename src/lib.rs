//! Notion Export - Incremental exporter for block-based content.
//!
//! This crate walks the pages of one or more content sources, renders each
//! page's block tree into a single markdown or HTML-flavored document,
//! downloads referenced assets next to it, and skips pages that have not
//! changed since their last export.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
