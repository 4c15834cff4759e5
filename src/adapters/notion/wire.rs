//! Wire model of the content service's JSON API and its conversion into
//! domain types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::content::{
    plain_text_of, Annotations, BlockKind, BlockType, ContentBlock, FileSource, Icon, LinkTarget,
    Media, PageMetadata, ParentRef, RichText, RichTextSpan, SourceMetadata, SpanContent,
    TableLayout,
};
use crate::domain::foundation::{BlockId, PageId, SourceId, Timestamp};
use crate::ports::{ContentApiError, SortDirection};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<QuerySort<'a>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuerySort<'a> {
    pub property: &'a str,
    pub direction: SortDirection,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

/// One page of a paginated listing.
#[derive(Debug, Deserialize)]
pub struct RawList<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl<T> RawList<T> {
    /// Cursor of the next page, if there is one.
    pub fn continuation(&self) -> Option<&str> {
        if self.has_more {
            self.next_cursor.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawObjectRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct RawErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RawDatabase {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RawRichText>,
}

#[derive(Debug, Deserialize)]
pub struct RawPage {
    pub id: String,
    pub last_edited_time: String,
    #[serde(default)]
    pub parent: Option<RawParent>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct RawParent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub database_id: Option<String>,
    #[serde(default)]
    pub page_id: Option<String>,
    #[serde(default)]
    pub block_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTitleProperty {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: Vec<RawRichText>,
}

#[derive(Debug, Deserialize)]
pub struct RawBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub payloads: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct RawRichText {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<RawText>,
    #[serde(default)]
    pub equation: Option<RawEquation>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawText {
    pub content: String,
    #[serde(default)]
    pub link: Option<RawUrl>,
}

#[derive(Debug, Deserialize)]
pub struct RawUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct RawEquation {
    pub expression: String,
}

// Block payloads

#[derive(Debug, Default, Deserialize)]
struct TextPayload {
    #[serde(default)]
    rich_text: Vec<RawRichText>,
}

#[derive(Debug, Deserialize)]
struct ToDoPayload {
    #[serde(default)]
    rich_text: Vec<RawRichText>,
    #[serde(default)]
    checked: bool,
}

#[derive(Debug, Deserialize)]
struct CodePayload {
    #[serde(default)]
    rich_text: Vec<RawRichText>,
    #[serde(default)]
    language: String,
    #[serde(default)]
    caption: Vec<RawRichText>,
}

#[derive(Debug, Deserialize)]
struct CalloutPayload {
    #[serde(default)]
    rich_text: Vec<RawRichText>,
    #[serde(default)]
    icon: Option<RawIcon>,
}

#[derive(Debug, Deserialize)]
struct RawIcon {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    emoji: Option<String>,
    #[serde(default)]
    external: Option<RawUrl>,
    #[serde(default)]
    file: Option<RawUrl>,
    #[serde(default)]
    custom_emoji: Option<RawUrl>,
}

#[derive(Debug, Deserialize)]
struct EquationPayload {
    expression: String,
}

#[derive(Debug, Deserialize)]
struct TitlePayload {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct UrlPayload {
    #[serde(default)]
    url: String,
    #[serde(default)]
    caption: Vec<RawRichText>,
}

#[derive(Debug, Deserialize)]
struct FilePayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    external: Option<RawUrl>,
    #[serde(default)]
    file: Option<RawUrl>,
    #[serde(default)]
    caption: Vec<RawRichText>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TablePayload {
    #[serde(default)]
    table_width: usize,
    #[serde(default)]
    has_column_header: bool,
    #[serde(default)]
    has_row_header: bool,
}

#[derive(Debug, Deserialize)]
struct TableRowPayload {
    #[serde(default)]
    cells: Vec<Vec<RawRichText>>,
}

#[derive(Debug, Deserialize)]
struct LinkToPagePayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    page_id: Option<String>,
    #[serde(default)]
    database_id: Option<String>,
    #[serde(default)]
    comment_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Conversion
// ════════════════════════════════════════════════════════════════════════════════

fn parse_error(what: &str, detail: impl std::fmt::Display) -> ContentApiError {
    ContentApiError::Parse(format!("{}: {}", what, detail))
}

impl RawRichText {
    pub fn into_span(self) -> RichTextSpan {
        let (content, link) = match self.kind.as_str() {
            "text" => match self.text {
                Some(text) => (SpanContent::Text(text.content), text.link.map(|l| l.url)),
                None => (SpanContent::Text(self.plain_text), None),
            },
            "equation" => match self.equation {
                Some(eq) => (SpanContent::Equation(eq.expression), None),
                None => (SpanContent::Text(self.plain_text), None),
            },
            "mention" => (
                SpanContent::Mention {
                    plain_text: self.plain_text,
                },
                self.href,
            ),
            _ => (SpanContent::Text(self.plain_text), None),
        };

        RichTextSpan {
            content,
            annotations: self.annotations,
            link,
        }
    }
}

fn spans(raw: Vec<RawRichText>) -> RichText {
    raw.into_iter().map(RawRichText::into_span).collect()
}

fn file_source(kind: &str, external: Option<RawUrl>, file: Option<RawUrl>) -> Result<FileSource, ContentApiError> {
    match (kind, external, file) {
        ("external", Some(external), _) => Ok(FileSource::External { url: external.url }),
        ("file", _, Some(file)) => Ok(FileSource::Hosted { url: file.url }),
        (kind, _, _) => Err(parse_error("file source", format!("unknown type '{}'", kind))),
    }
}

fn media(payload: FilePayload) -> Result<Media, ContentApiError> {
    Ok(Media {
        source: file_source(&payload.kind, payload.external, payload.file)?,
        caption: spans(payload.caption),
        name: payload.name,
    })
}

fn icon(raw: RawIcon) -> Option<Icon> {
    match raw.kind.as_str() {
        "emoji" => raw.emoji.map(Icon::Emoji),
        "external" => raw.external.map(|u| Icon::External(u.url)),
        "file" => raw.file.map(|u| Icon::File(u.url)),
        "custom_emoji" => raw.custom_emoji.map(|u| Icon::CustomEmoji(u.url)),
        _ => None,
    }
}

fn payload<T: serde::de::DeserializeOwned>(block_type: &str, value: Value) -> Result<T, ContentApiError> {
    serde_json::from_value(value).map_err(|e| parse_error(block_type, e))
}

impl RawBlock {
    /// Converts the block. Types this crate does not know become
    /// [`BlockKind::Unsupported`] rather than errors.
    pub fn into_block(mut self) -> Result<ContentBlock, ContentApiError> {
        let id = BlockId::parse(&self.id).map_err(|e| parse_error("block id", e))?;
        let value = self
            .payloads
            .remove(&self.kind)
            .filter(|v| !v.is_null())
            .unwrap_or_else(|| Value::Object(Map::new()));
        let tag = self.kind.as_str();

        let text = |value: Value| -> Result<RichText, ContentApiError> {
            let p: TextPayload = payload(tag, value)?;
            Ok(spans(p.rich_text))
        };

        let kind = match BlockType::from_api_tag(tag) {
            None => BlockKind::Unsupported {
                reported_type: self.kind.clone(),
            },
            Some(ty) => match ty {
                BlockType::Paragraph => BlockKind::Paragraph { text: text(value)? },
                BlockType::Heading1 => BlockKind::Heading1 { text: text(value)? },
                BlockType::Heading2 => BlockKind::Heading2 { text: text(value)? },
                BlockType::Heading3 => BlockKind::Heading3 { text: text(value)? },
                BlockType::BulletedListItem => BlockKind::BulletedListItem { text: text(value)? },
                BlockType::NumberedListItem => BlockKind::NumberedListItem { text: text(value)? },
                BlockType::Quote => BlockKind::Quote { text: text(value)? },
                BlockType::Toggle => BlockKind::Toggle { text: text(value)? },
                BlockType::Template => BlockKind::Template { text: text(value)? },
                BlockType::SyncedBlock => BlockKind::SyncedBlock { text: text(value)? },
                BlockType::ToDo => {
                    let p: ToDoPayload = payload(tag, value)?;
                    BlockKind::ToDo {
                        text: spans(p.rich_text),
                        checked: p.checked,
                    }
                }
                BlockType::ChildPage => {
                    let p: TitlePayload = payload(tag, value)?;
                    BlockKind::ChildPage { title: p.title }
                }
                BlockType::ChildDatabase => {
                    let p: TitlePayload = payload(tag, value)?;
                    BlockKind::ChildDatabase { title: p.title }
                }
                BlockType::Equation => {
                    let p: EquationPayload = payload(tag, value)?;
                    BlockKind::Equation {
                        expression: p.expression,
                    }
                }
                BlockType::Code => {
                    let p: CodePayload = payload(tag, value)?;
                    BlockKind::Code {
                        text: spans(p.rich_text),
                        language: p.language,
                        caption: spans(p.caption),
                    }
                }
                BlockType::Callout => {
                    let p: CalloutPayload = payload(tag, value)?;
                    BlockKind::Callout {
                        text: spans(p.rich_text),
                        icon: p.icon.and_then(icon),
                    }
                }
                BlockType::Divider => BlockKind::Divider,
                BlockType::Breadcrumb => BlockKind::Breadcrumb,
                BlockType::TableOfContents => BlockKind::TableOfContents,
                BlockType::ColumnList => BlockKind::ColumnList,
                BlockType::Column => BlockKind::Column,
                BlockType::LinkToPage => {
                    let p: LinkToPagePayload = payload(tag, value)?;
                    let target = match p.kind.as_str() {
                        "database_id" => LinkTarget::Database(p.database_id.unwrap_or_default()),
                        "comment_id" => LinkTarget::Comment(p.comment_id.unwrap_or_default()),
                        _ => LinkTarget::Page(p.page_id.unwrap_or_default()),
                    };
                    BlockKind::LinkToPage { target }
                }
                BlockType::Table => {
                    let p: TablePayload = payload(tag, value)?;
                    BlockKind::Table {
                        layout: TableLayout {
                            width: p.table_width,
                            has_column_header: p.has_column_header,
                            has_row_header: p.has_row_header,
                        },
                    }
                }
                BlockType::TableRow => {
                    let p: TableRowPayload = payload(tag, value)?;
                    BlockKind::TableRow {
                        cells: p.cells.into_iter().map(spans).collect(),
                    }
                }
                BlockType::Embed => {
                    let p: UrlPayload = payload(tag, value)?;
                    BlockKind::Embed {
                        url: p.url,
                        caption: spans(p.caption),
                    }
                }
                BlockType::Bookmark => {
                    let p: UrlPayload = payload(tag, value)?;
                    BlockKind::Bookmark {
                        url: p.url,
                        caption: spans(p.caption),
                    }
                }
                BlockType::LinkPreview => {
                    let p: UrlPayload = payload(tag, value)?;
                    BlockKind::LinkPreview { url: p.url }
                }
                BlockType::Image => BlockKind::Image(media(payload(tag, value)?)?),
                BlockType::Video => BlockKind::Video(media(payload(tag, value)?)?),
                BlockType::Pdf => BlockKind::Pdf(media(payload(tag, value)?)?),
                BlockType::File => BlockKind::File(media(payload(tag, value)?)?),
                BlockType::Audio => BlockKind::Audio(media(payload(tag, value)?)?),
                BlockType::Unsupported => BlockKind::Unsupported {
                    reported_type: self.kind.clone(),
                },
            },
        };

        Ok(ContentBlock {
            id,
            has_children: self.has_children,
            kind,
        })
    }
}

impl RawPage {
    pub fn into_metadata(self) -> Result<PageMetadata, ContentApiError> {
        let id = PageId::parse(&self.id).map_err(|e| parse_error("page id", e))?;
        let last_edited_time = Timestamp::parse_rfc3339(&self.last_edited_time)
            .map_err(|e| parse_error("last_edited_time", e))?;

        let title = self
            .properties
            .into_iter()
            .filter_map(|(_, value)| serde_json::from_value::<RawTitleProperty>(value).ok())
            .find(|property| property.kind == "title")
            .map(|property| plain_text_of(&spans(property.title)))
            .unwrap_or_default();

        let parent = match self.parent {
            None => ParentRef::Workspace,
            Some(parent) => parent.into_ref()?,
        };

        Ok(PageMetadata {
            id,
            title,
            last_edited_time,
            parent,
        })
    }
}

impl RawParent {
    fn into_ref(self) -> Result<ParentRef, ContentApiError> {
        let parse = |id: Option<String>| id.unwrap_or_default();
        Ok(match self.kind.as_str() {
            "database_id" => ParentRef::Source(
                SourceId::parse(&parse(self.database_id)).map_err(|e| parse_error("parent", e))?,
            ),
            "page_id" => ParentRef::Page(
                PageId::parse(&parse(self.page_id)).map_err(|e| parse_error("parent", e))?,
            ),
            "block_id" => ParentRef::Block(
                BlockId::parse(&parse(self.block_id)).map_err(|e| parse_error("parent", e))?,
            ),
            _ => ParentRef::Workspace,
        })
    }
}

impl RawDatabase {
    pub fn into_metadata(self) -> Result<SourceMetadata, ContentApiError> {
        Ok(SourceMetadata {
            id: SourceId::parse(&self.id).map_err(|e| parse_error("source id", e))?,
            title: plain_text_of(&spans(self.title)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "1429989f-e8ac-4eff-bc8f-57f56486db54";

    fn block(value: Value) -> ContentBlock {
        serde_json::from_value::<RawBlock>(value)
            .unwrap()
            .into_block()
            .unwrap()
    }

    #[test]
    fn paragraph_with_annotated_link() {
        let b = block(json!({
            "object": "block",
            "id": ID,
            "type": "paragraph",
            "has_children": false,
            "paragraph": {
                "color": "default",
                "rich_text": [{
                    "type": "text",
                    "text": { "content": "Docs", "link": { "url": "https://docs.rs" } },
                    "annotations": { "bold": true, "italic": false, "strikethrough": false,
                                     "underline": false, "code": false, "color": "default" },
                    "plain_text": "Docs",
                    "href": "https://docs.rs"
                }]
            }
        }));

        let BlockKind::Paragraph { text } = b.kind else {
            panic!("expected paragraph");
        };
        assert_eq!(text, vec![RichTextSpan::text("Docs").bold().with_link("https://docs.rs")]);
    }

    #[test]
    fn mention_keeps_display_text_and_href() {
        let raw: RawRichText = serde_json::from_value(json!({
            "type": "mention",
            "mention": { "type": "page", "page": { "id": ID } },
            "annotations": {},
            "plain_text": "Launch plan",
            "href": "https://www.notion.so/1429989fe8ac4effbc8f57f56486db54"
        }))
        .unwrap();

        let span = raw.into_span();
        assert_eq!(
            span.content,
            SpanContent::Mention {
                plain_text: "Launch plan".into()
            }
        );
        assert!(span.link.is_some());
    }

    #[test]
    fn to_do_with_children() {
        let b = block(json!({
            "id": ID, "type": "to_do", "has_children": true,
            "to_do": { "rich_text": [], "checked": true }
        }));
        assert!(b.has_children);
        assert_eq!(
            b.kind,
            BlockKind::ToDo {
                text: vec![],
                checked: true
            }
        );
    }

    #[test]
    fn hosted_image_with_caption() {
        let b = block(json!({
            "id": ID, "type": "image", "has_children": false,
            "image": {
                "type": "file",
                "file": { "url": "https://s3.example/x.png?sig=1", "expiry_time": "2024-01-01T00:00:00.000Z" },
                "caption": [{ "type": "text", "text": { "content": "Cat" }, "plain_text": "Cat" }]
            }
        }));
        let BlockKind::Image(media) = b.kind else {
            panic!("expected image");
        };
        assert!(media.source.is_hosted());
        assert_eq!(media.caption.len(), 1);
    }

    #[test]
    fn callout_icons() {
        let b = block(json!({
            "id": ID, "type": "callout",
            "callout": { "rich_text": [], "icon": { "type": "emoji", "emoji": "💡" } }
        }));
        assert_eq!(
            b.kind,
            BlockKind::Callout {
                text: vec![],
                icon: Some(Icon::Emoji("💡".into()))
            }
        );
    }

    #[test]
    fn table_row_cells() {
        let b = block(json!({
            "id": ID, "type": "table_row",
            "table_row": { "cells": [
                [{ "type": "text", "text": { "content": "a" }, "plain_text": "a" }],
                []
            ]}
        }));
        let BlockKind::TableRow { cells } = b.kind else {
            panic!("expected row");
        };
        assert_eq!(cells.len(), 2);
        assert!(cells[1].is_empty());
    }

    #[test]
    fn unknown_type_becomes_unsupported() {
        let b = block(json!({ "id": ID, "type": "ai_block", "ai_block": {} }));
        assert_eq!(
            b.kind,
            BlockKind::Unsupported {
                reported_type: "ai_block".into()
            }
        );
    }

    #[test]
    fn synced_block_without_text() {
        let b = block(json!({
            "id": ID, "type": "synced_block", "has_children": true,
            "synced_block": { "synced_from": null }
        }));
        assert_eq!(b.kind, BlockKind::SyncedBlock { text: vec![] });
    }

    #[test]
    fn bad_id_is_parse_error() {
        let raw: RawBlock =
            serde_json::from_value(json!({ "id": "nope", "type": "divider", "divider": {} }))
                .unwrap();
        assert!(matches!(raw.into_block(), Err(ContentApiError::Parse(_))));
    }

    #[test]
    fn page_title_comes_from_title_property() {
        let raw: RawPage = serde_json::from_value(json!({
            "object": "page",
            "id": ID,
            "last_edited_time": "2024-03-01T12:00:00.000Z",
            "parent": { "type": "database_id", "database_id": "0f0e0d0c-0b0a-0908-0706-050403020100" },
            "properties": {
                "Start - End Dates": { "id": "a", "type": "date", "date": null },
                "Name": { "id": "title", "type": "title", "title": [
                    { "type": "text", "text": { "content": "Launch " }, "plain_text": "Launch " },
                    { "type": "text", "text": { "content": "plan" }, "plain_text": "plan" }
                ]}
            }
        }))
        .unwrap();

        let page = raw.into_metadata().unwrap();
        assert_eq!(page.title, "Launch plan");
        assert_eq!(page.last_edited_time.to_rfc3339(), "2024-03-01T12:00:00.000Z");
        assert!(matches!(page.parent, ParentRef::Source(_)));
    }

    #[test]
    fn database_title() {
        let raw: RawDatabase = serde_json::from_value(json!({
            "id": ID,
            "title": [{ "type": "text", "text": { "content": "Projects" }, "plain_text": "Projects" }]
        }))
        .unwrap();
        assert_eq!(raw.into_metadata().unwrap().title, "Projects");
    }

    #[test]
    fn query_request_omits_empty_fields() {
        let body = serde_json::to_value(QueryRequest {
            page_size: 100,
            start_cursor: None,
            sorts: vec![],
        })
        .unwrap();
        assert_eq!(body, json!({ "page_size": 100 }));

        let body = serde_json::to_value(QueryRequest {
            page_size: 10,
            start_cursor: Some("abc"),
            sorts: vec![QuerySort {
                property: "Start - End Dates",
                direction: SortDirection::Descending,
            }],
        })
        .unwrap();
        assert_eq!(body["sorts"][0]["direction"], "descending");
        assert_eq!(body["start_cursor"], "abc");
    }

    #[test]
    fn list_continuation_requires_has_more() {
        let list: RawList<RawObjectRef> = serde_json::from_value(json!({
            "results": [{ "id": ID }], "has_more": false, "next_cursor": "x"
        }))
        .unwrap();
        assert_eq!(list.continuation(), None);
    }
}
