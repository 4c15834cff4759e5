//! Content blocks: the nodes of a page's document tree.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::rich_text::RichText;
use crate::domain::foundation::BlockId;

/// Closed set of block type tags reported by the content service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletedListItem,
    NumberedListItem,
    Quote,
    ToDo,
    Toggle,
    Template,
    SyncedBlock,
    ChildPage,
    ChildDatabase,
    Equation,
    Code,
    Callout,
    Divider,
    Breadcrumb,
    TableOfContents,
    ColumnList,
    Column,
    LinkToPage,
    Table,
    TableRow,
    Embed,
    Bookmark,
    Image,
    Video,
    Pdf,
    File,
    Audio,
    LinkPreview,
    Unsupported,
}

impl BlockType {
    /// Returns all block types.
    pub fn all() -> &'static [BlockType] {
        use BlockType::*;
        &[
            Paragraph,
            Heading1,
            Heading2,
            Heading3,
            BulletedListItem,
            NumberedListItem,
            Quote,
            ToDo,
            Toggle,
            Template,
            SyncedBlock,
            ChildPage,
            ChildDatabase,
            Equation,
            Code,
            Callout,
            Divider,
            Breadcrumb,
            TableOfContents,
            ColumnList,
            Column,
            LinkToPage,
            Table,
            TableRow,
            Embed,
            Bookmark,
            Image,
            Video,
            Pdf,
            File,
            Audio,
            LinkPreview,
            Unsupported,
        ]
    }

    /// Returns the tag used by the content service API.
    pub fn as_str(&self) -> &'static str {
        use BlockType::*;
        match self {
            Paragraph => "paragraph",
            Heading1 => "heading_1",
            Heading2 => "heading_2",
            Heading3 => "heading_3",
            BulletedListItem => "bulleted_list_item",
            NumberedListItem => "numbered_list_item",
            Quote => "quote",
            ToDo => "to_do",
            Toggle => "toggle",
            Template => "template",
            SyncedBlock => "synced_block",
            ChildPage => "child_page",
            ChildDatabase => "child_database",
            Equation => "equation",
            Code => "code",
            Callout => "callout",
            Divider => "divider",
            Breadcrumb => "breadcrumb",
            TableOfContents => "table_of_contents",
            ColumnList => "column_list",
            Column => "column",
            LinkToPage => "link_to_page",
            Table => "table",
            TableRow => "table_row",
            Embed => "embed",
            Bookmark => "bookmark",
            Image => "image",
            Video => "video",
            Pdf => "pdf",
            File => "file",
            Audio => "audio",
            LinkPreview => "link_preview",
            Unsupported => "unsupported",
        }
    }

    /// Looks up a type by its API tag.
    pub fn from_api_tag(tag: &str) -> Option<BlockType> {
        Self::all().iter().copied().find(|t| t.as_str() == tag)
    }

    /// Types that render to nothing and are reported as warnings.
    pub fn is_omitted(&self) -> bool {
        use BlockType::*;
        matches!(
            self,
            Breadcrumb
                | TableOfContents
                | ColumnList
                | Column
                | LinkToPage
                | ChildPage
                | ChildDatabase
                | Unsupported
        )
    }

    /// Types whose children form a document of their own and are not
    /// walked as part of the enclosing page.
    pub fn is_document_boundary(&self) -> bool {
        matches!(self, BlockType::ChildPage | BlockType::ChildDatabase)
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, BlockType::BulletedListItem | BlockType::NumberedListItem)
    }

    /// Types whose children are rendered one indentation level deeper.
    pub fn is_indentable(&self) -> bool {
        self.is_list_item() || matches!(self, BlockType::ToDo | BlockType::Toggle)
    }

    /// Types whose non-matching children are nested content of the item.
    pub fn is_container(&self) -> bool {
        self.is_list_item() || matches!(self, BlockType::Toggle)
    }

    /// Types terminated by a single line break rather than a paragraph break.
    pub fn is_line_break(&self) -> bool {
        self.is_list_item() || matches!(self, BlockType::Toggle | BlockType::Table | BlockType::TableRow)
    }

    /// Types that display their caption after the rendered content.
    pub fn supports_caption(&self) -> bool {
        use BlockType::*;
        matches!(self, Code | Embed | Bookmark | Image | Video | Pdf | File)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a binary asset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Hosted elsewhere; linked as is.
    External { url: String },
    /// Uploaded to the content service; the URL is short-lived and the file
    /// must be downloaded.
    Hosted { url: String },
}

impl FileSource {
    pub fn url(&self) -> &str {
        match self {
            FileSource::External { url } | FileSource::Hosted { url } => url,
        }
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self, FileSource::Hosted { .. })
    }
}

/// Payload of image, video, pdf, file and audio blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub source: FileSource,
    pub caption: RichText,
    /// Display name, set for file blocks.
    pub name: Option<String>,
}

/// Icon of a callout block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    Emoji(String),
    External(String),
    File(String),
    CustomEmoji(String),
}

/// Target of a link-to-page block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Page(String),
    Database(String),
    Comment(String),
}

/// Shape of a table block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableLayout {
    pub width: usize,
    pub has_column_header: bool,
    pub has_row_header: bool,
}

/// Type-specific payload of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph { text: RichText },
    Heading1 { text: RichText },
    Heading2 { text: RichText },
    Heading3 { text: RichText },
    BulletedListItem { text: RichText },
    NumberedListItem { text: RichText },
    Quote { text: RichText },
    ToDo { text: RichText, checked: bool },
    Toggle { text: RichText },
    Template { text: RichText },
    SyncedBlock { text: RichText },
    ChildPage { title: String },
    ChildDatabase { title: String },
    Equation { expression: String },
    Code { text: RichText, language: String, caption: RichText },
    Callout { text: RichText, icon: Option<Icon> },
    Divider,
    Breadcrumb,
    TableOfContents,
    ColumnList,
    Column,
    LinkToPage { target: LinkTarget },
    Table { layout: TableLayout },
    TableRow { cells: Vec<RichText> },
    Embed { url: String, caption: RichText },
    Bookmark { url: String, caption: RichText },
    Image(Media),
    Video(Media),
    Pdf(Media),
    File(Media),
    Audio(Media),
    LinkPreview { url: String },
    /// A type this crate does not know, with the tag the service reported.
    Unsupported { reported_type: String },
}

impl BlockKind {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Paragraph { .. } => BlockType::Paragraph,
            BlockKind::Heading1 { .. } => BlockType::Heading1,
            BlockKind::Heading2 { .. } => BlockType::Heading2,
            BlockKind::Heading3 { .. } => BlockType::Heading3,
            BlockKind::BulletedListItem { .. } => BlockType::BulletedListItem,
            BlockKind::NumberedListItem { .. } => BlockType::NumberedListItem,
            BlockKind::Quote { .. } => BlockType::Quote,
            BlockKind::ToDo { .. } => BlockType::ToDo,
            BlockKind::Toggle { .. } => BlockType::Toggle,
            BlockKind::Template { .. } => BlockType::Template,
            BlockKind::SyncedBlock { .. } => BlockType::SyncedBlock,
            BlockKind::ChildPage { .. } => BlockType::ChildPage,
            BlockKind::ChildDatabase { .. } => BlockType::ChildDatabase,
            BlockKind::Equation { .. } => BlockType::Equation,
            BlockKind::Code { .. } => BlockType::Code,
            BlockKind::Callout { .. } => BlockType::Callout,
            BlockKind::Divider => BlockType::Divider,
            BlockKind::Breadcrumb => BlockType::Breadcrumb,
            BlockKind::TableOfContents => BlockType::TableOfContents,
            BlockKind::ColumnList => BlockType::ColumnList,
            BlockKind::Column => BlockType::Column,
            BlockKind::LinkToPage { .. } => BlockType::LinkToPage,
            BlockKind::Table { .. } => BlockType::Table,
            BlockKind::TableRow { .. } => BlockType::TableRow,
            BlockKind::Embed { .. } => BlockType::Embed,
            BlockKind::Bookmark { .. } => BlockType::Bookmark,
            BlockKind::Image(_) => BlockType::Image,
            BlockKind::Video(_) => BlockType::Video,
            BlockKind::Pdf(_) => BlockType::Pdf,
            BlockKind::File(_) => BlockType::File,
            BlockKind::Audio(_) => BlockType::Audio,
            BlockKind::LinkPreview { .. } => BlockType::LinkPreview,
            BlockKind::Unsupported { .. } => BlockType::Unsupported,
        }
    }

    /// Primary rich text of text-bearing blocks.
    pub fn text(&self) -> Option<&RichText> {
        match self {
            BlockKind::Paragraph { text }
            | BlockKind::Heading1 { text }
            | BlockKind::Heading2 { text }
            | BlockKind::Heading3 { text }
            | BlockKind::BulletedListItem { text }
            | BlockKind::NumberedListItem { text }
            | BlockKind::Quote { text }
            | BlockKind::ToDo { text, .. }
            | BlockKind::Toggle { text }
            | BlockKind::Template { text }
            | BlockKind::SyncedBlock { text }
            | BlockKind::Code { text, .. }
            | BlockKind::Callout { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Caption of blocks that carry one.
    pub fn caption(&self) -> Option<&RichText> {
        match self {
            BlockKind::Code { caption, .. }
            | BlockKind::Embed { caption, .. }
            | BlockKind::Bookmark { caption, .. } => Some(caption),
            BlockKind::Image(media)
            | BlockKind::Video(media)
            | BlockKind::Pdf(media)
            | BlockKind::File(media)
            | BlockKind::Audio(media) => Some(&media.caption),
            _ => None,
        }
    }
}

/// A node of a page's document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    pub id: BlockId,
    pub has_children: bool,
    pub kind: BlockKind,
}

impl ContentBlock {
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            has_children: false,
            kind,
        }
    }

    /// Marks the block as having children.
    pub fn with_children(mut self) -> Self {
        self.has_children = true;
        self
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::RichTextSpan;

    #[test]
    fn all_returns_every_type_once() {
        let all = BlockType::all();
        assert_eq!(all.len(), 33);
        let unique: std::collections::BTreeSet<_> = all.iter().collect();
        assert_eq!(unique.len(), 33);
    }

    #[test]
    fn api_tags_round_trip() {
        for ty in BlockType::all() {
            assert_eq!(BlockType::from_api_tag(ty.as_str()), Some(*ty));
        }
        assert_eq!(BlockType::from_api_tag("ai_block"), None);
    }

    #[test]
    fn serde_uses_api_tags() {
        let json = serde_json::to_string(&BlockType::Heading1).unwrap();
        assert_eq!(json, "\"heading_1\"");
        let json = serde_json::to_string(&BlockType::ToDo).unwrap();
        assert_eq!(json, "\"to_do\"");
    }

    #[test]
    fn omitted_set_is_exact() {
        let omitted: Vec<_> = BlockType::all()
            .iter()
            .filter(|t| t.is_omitted())
            .map(|t| t.as_str())
            .collect();
        assert_eq!(
            omitted,
            vec![
                "child_page",
                "child_database",
                "breadcrumb",
                "table_of_contents",
                "column_list",
                "column",
                "link_to_page",
                "unsupported"
            ]
        );
    }

    #[test]
    fn to_do_indents_but_is_not_a_container() {
        assert!(BlockType::ToDo.is_indentable());
        assert!(!BlockType::ToDo.is_container());
        assert!(BlockType::Toggle.is_container());
        assert!(BlockType::NumberedListItem.is_container());
    }

    #[test]
    fn caption_capability_excludes_audio() {
        assert!(BlockType::Image.supports_caption());
        assert!(BlockType::Code.supports_caption());
        assert!(!BlockType::Audio.supports_caption());
        assert!(!BlockType::Paragraph.supports_caption());
    }

    #[test]
    fn kind_reports_matching_type_and_text() {
        let kind = BlockKind::ToDo {
            text: vec![RichTextSpan::text("buy milk")],
            checked: true,
        };
        assert_eq!(kind.block_type(), BlockType::ToDo);
        assert_eq!(kind.text().map(|t| t.len()), Some(1));
        assert!(kind.caption().is_none());
    }

    #[test]
    fn file_source_exposes_url() {
        let hosted = FileSource::Hosted {
            url: "https://files.example/a.png".into(),
        };
        assert!(hosted.is_hosted());
        assert_eq!(hosted.url(), "https://files.example/a.png");
    }
}
