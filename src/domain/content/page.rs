//! Page and source metadata returned by the content service.

use crate::domain::foundation::{BlockId, PageId, SourceId, Timestamp};

/// What a page hangs off of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    Source(SourceId),
    Page(PageId),
    Block(BlockId),
    Workspace,
}

/// Metadata of one exportable page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub id: PageId,
    pub title: String,
    pub last_edited_time: Timestamp,
    pub parent: ParentRef,
}

impl PageMetadata {
    /// Name used for the output file. Falls back to the id for untitled pages.
    pub fn file_stem(&self) -> String {
        page_file_stem(&self.title, &self.id)
    }
}

/// File stem of a page with the given title and id.
pub fn page_file_stem(title: &str, id: &PageId) -> String {
    let sanitized = sanitize_file_name(title);
    if sanitized.is_empty() {
        id.compact()
    } else {
        sanitized
    }
}

/// Metadata of a source collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMetadata {
    pub id: SourceId,
    pub title: String,
}

impl SourceMetadata {
    /// Folder name used for the source's output. Falls back to the id.
    pub fn folder_name(&self) -> String {
        let sanitized = sanitize_file_name(&self.title);
        if sanitized.is_empty() {
            self.id.compact()
        } else {
            sanitized
        }
    }
}

/// Replaces characters that are not allowed in file names on common
/// filesystems and trims surrounding whitespace and dots.
pub fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    replaced.trim().trim_matches('.').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_path_separators() {
        assert_eq!(sanitize_file_name("Q1/Q2: plan?"), "Q1-Q2- plan-");
    }

    #[test]
    fn sanitize_trims_dots_and_whitespace() {
        assert_eq!(sanitize_file_name("  ..hidden.. "), "hidden");
        assert_eq!(sanitize_file_name(".."), "");
    }

    #[test]
    fn untitled_page_uses_id() {
        let page = PageMetadata {
            id: PageId::parse("1429989fe8ac4effbc8f57f56486db54").unwrap(),
            title: "   ".into(),
            last_edited_time: Timestamp::now(),
            parent: ParentRef::Workspace,
        };
        assert_eq!(page.file_stem(), "1429989fe8ac4effbc8f57f56486db54");
    }

    #[test]
    fn titled_source_uses_title() {
        let source = SourceMetadata {
            id: SourceId::new(),
            title: "Projects".into(),
        };
        assert_eq!(source.folder_name(), "Projects");
    }
}
