//! Export handlers.
//!
//! - `ExportSourcesHandler` - Exports every page of a set of sources
//! - `DocumentAssembler` - Walks one page's block tree into a document
//! - `SyncLedger` - Shared sync log with serialized updates

mod assemble_document;
mod errors;
mod export_sources;
mod sync_ledger;

pub use assemble_document::{AssembledDocument, DocumentAssembler};
pub use errors::ExportError;
pub use export_sources::{ExportFailure, ExportReport, ExportSourcesCommand, ExportSourcesHandler};
pub use sync_ledger::SyncLedger;
