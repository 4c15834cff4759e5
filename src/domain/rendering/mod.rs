//! Rendering of content blocks into markup.
//!
//! - `rich_text` - Inline spans to markup
//! - `block_renderer` - One block to one fragment
//! - `layout` - Placing fragments in a page buffer
//! - `context` - Positional state passed down the tree walk

mod block_renderer;
mod context;
pub mod layout;
mod rich_text;
mod warnings;

pub use block_renderer::{BlockRenderer, Bracket, Fragment};
pub use context::{DocumentScope, OutputSyntax, RenderContext};
pub use rich_text::{render_rich_text, render_span, render_table_cell};
pub use warnings::{PageWarnings, WarningLog};
