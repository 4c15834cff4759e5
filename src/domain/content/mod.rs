//! Content model of the remote service: blocks, rich text and page metadata.

mod block;
mod page;
mod rich_text;

pub use block::{
    BlockKind, BlockType, ContentBlock, FileSource, Icon, LinkTarget, Media, TableLayout,
};
pub use page::{page_file_stem, sanitize_file_name, PageMetadata, ParentRef, SourceMetadata};
pub use rich_text::{plain_text_of, Annotations, RichText, RichTextSpan, SpanContent};
