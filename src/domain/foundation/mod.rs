//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps and validation errors that form the
//! vocabulary of the exporter.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{BlockId, PageId, SourceId};
pub use timestamp::Timestamp;
