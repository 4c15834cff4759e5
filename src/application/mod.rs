//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    AssembledDocument, DocumentAssembler, ExportError, ExportFailure, ExportReport,
    ExportSourcesCommand, ExportSourcesHandler, SyncLedger,
};
