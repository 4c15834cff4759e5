//! Positional parameters carried through the tree walk.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::content::BlockType;
use crate::domain::foundation::{BlockId, PageId, SourceId, ValidationError};

/// Output flavor, chosen once per export run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSyntax {
    /// Markdown mixed with inline HTML tags.
    #[default]
    Rich,
    /// Pure markdown.
    Plain,
}

impl OutputSyntax {
    /// One level of indentation.
    pub fn indent_unit(&self) -> &'static str {
        match self {
            OutputSyntax::Rich => "\t",
            OutputSyntax::Plain => "    ",
        }
    }

    pub fn is_rich(&self) -> bool {
        matches!(self, OutputSyntax::Rich)
    }
}

impl fmt::Display for OutputSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputSyntax::Rich => write!(f, "rich"),
            OutputSyntax::Plain => write!(f, "plain"),
        }
    }
}

impl FromStr for OutputSyntax {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rich" => Ok(OutputSyntax::Rich),
            "plain" => Ok(OutputSyntax::Plain),
            other => Err(ValidationError::invalid_format(
                "syntax",
                format!("expected 'rich' or 'plain', got '{}'", other),
            )),
        }
    }
}

/// Names of the document being assembled, used for asset naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentScope {
    pub source_id: SourceId,
    /// Folder holding the source's documents and assets.
    pub source_folder: String,
    pub page_id: PageId,
    pub page_title: String,
    /// File stem of the page's document.
    pub page_stem: String,
}

impl DocumentScope {
    /// Deterministic owner key of an asset referenced by `block`.
    pub fn asset_owner(&self, block: &BlockId) -> String {
        format!("{} {}", self.page_stem, block)
    }
}

/// Where a block sits in the tree. Derived from the parent's context for
/// every child and dropped when the child returns.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub scope: &'a DocumentScope,
    pub syntax: OutputSyntax,
    pub depth: usize,
    pub sibling_index: usize,
    pub last_sibling_index: usize,
    pub parent_type: Option<BlockType>,
    pub previous_sibling: Option<BlockType>,
    pub next_sibling: Option<BlockType>,
}

impl<'a> RenderContext<'a> {
    /// Context of the page's top-level blocks.
    pub fn root(scope: &'a DocumentScope, syntax: OutputSyntax) -> Self {
        Self {
            scope,
            syntax,
            depth: 0,
            sibling_index: 0,
            last_sibling_index: 0,
            parent_type: None,
            previous_sibling: None,
            next_sibling: None,
        }
    }

    /// Context for the children of a block of type `parent`. Depth advances
    /// only below indentable types.
    pub fn descend(&self, parent: BlockType) -> Self {
        Self {
            depth: if parent.is_indentable() {
                self.depth + 1
            } else {
                self.depth
            },
            parent_type: Some(parent),
            sibling_index: 0,
            last_sibling_index: 0,
            previous_sibling: None,
            next_sibling: None,
            ..*self
        }
    }

    /// Context for the sibling at `index` among `siblings`.
    pub fn at(&self, index: usize, siblings: &[BlockType]) -> Self {
        Self {
            sibling_index: index,
            last_sibling_index: siblings.len().saturating_sub(1),
            previous_sibling: index.checked_sub(1).and_then(|i| siblings.get(i).copied()),
            next_sibling: siblings.get(index + 1).copied(),
            ..*self
        }
    }

    /// True when a block of type `ty` is the first of a run of same-type
    /// siblings.
    pub fn starts_run(&self, ty: BlockType) -> bool {
        self.sibling_index == 0 || self.previous_sibling != Some(ty)
    }

    /// True when a block of type `ty` is the last of a run of same-type
    /// siblings.
    pub fn ends_run(&self, ty: BlockType) -> bool {
        self.sibling_index >= self.last_sibling_index || self.next_sibling != Some(ty)
    }

    /// True when the parent is a list item or toggle.
    pub fn inside_container(&self) -> bool {
        self.parent_type.map_or(false, |p| p.is_container())
    }

    /// True when a block of type `ty` is content nested under a list item or
    /// toggle of a different type, rather than a continuation of it.
    pub fn is_nested_content(&self, ty: BlockType) -> bool {
        !ty.is_container() && self.parent_type.map_or(false, |p| p.is_container() && p != ty)
    }
}
