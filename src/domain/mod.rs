//! Domain layer containing the content model and rendering logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `content` - Blocks, rich text and page metadata
//! - `rendering` - Rich text and block rendering, layout rules
//! - `sync` - Sync log deciding which pages need re-export

pub mod content;
pub mod foundation;
pub mod rendering;
pub mod sync;
