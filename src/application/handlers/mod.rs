//! Application handlers.
//!
//! Command handlers that orchestrate domain operations over ports.

pub mod export;

pub use export::{
    AssembledDocument, DocumentAssembler, ExportError, ExportFailure, ExportReport,
    ExportSourcesCommand, ExportSourcesHandler, SyncLedger,
};
