//! DocumentAssembler - Walks a page's block tree into one document.
//!
//! The walk is depth first and strictly sequential. Every block is rendered
//! with a context derived from its parent and siblings, its fragment is
//! placed in the page buffer, its children are walked, and only then is any
//! bracket it opened closed. Siblings are never rendered concurrently: a
//! bracket can only be closed once the blocks before it are in the buffer.

use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;

use super::ExportError;
use crate::domain::content::{BlockType, ContentBlock};
use crate::domain::foundation::BlockId;
use crate::domain::rendering::layout::{close, place, terminator, trim_dangling_table_separator};
use crate::domain::rendering::{BlockRenderer, DocumentScope, OutputSyntax, RenderContext, WarningLog};
use crate::ports::{AssetResolver, ContentApi};

/// A rendered page and the block types it left out.
#[derive(Debug, Clone, Default)]
pub struct AssembledDocument {
    pub content: String,
    pub warnings: WarningLog,
}

/// Assembles page documents from the content service.
pub struct DocumentAssembler {
    content: Arc<dyn ContentApi>,
    assets: Arc<dyn AssetResolver>,
}

impl DocumentAssembler {
    pub fn new(content: Arc<dyn ContentApi>, assets: Arc<dyn AssetResolver>) -> Self {
        Self { content, assets }
    }

    /// Renders the page named by `scope`. The page block itself contributes
    /// nothing; its children are the top level of the document.
    pub async fn assemble(
        &self,
        scope: &DocumentScope,
        syntax: OutputSyntax,
    ) -> Result<AssembledDocument, ExportError> {
        let mut walk = Walk {
            content: self.content.as_ref(),
            renderer: BlockRenderer::new(self.assets.as_ref()),
            out: String::new(),
            warnings: WarningLog::new(),
        };

        walk.visit_children(scope.page_id.into(), RenderContext::root(scope, syntax))
            .await?;
        trim_dangling_table_separator(&mut walk.out);

        Ok(AssembledDocument {
            content: walk.out,
            warnings: walk.warnings,
        })
    }
}

/// State of one page walk.
struct Walk<'a> {
    content: &'a dyn ContentApi,
    renderer: BlockRenderer<'a>,
    out: String,
    warnings: WarningLog,
}

impl<'a> Walk<'a> {
    fn visit_children<'w>(
        &'w mut self,
        parent: BlockId,
        ctx: RenderContext<'w>,
    ) -> BoxFuture<'w, Result<(), ExportError>> {
        async move {
            let children = self.content.get_block_children(&parent).await?;
            let types: Vec<BlockType> = children.iter().map(ContentBlock::block_type).collect();

            for (index, child) in children.iter().enumerate() {
                self.visit(child, ctx.at(index, &types)).await?;
            }
            Ok(())
        }
        .boxed()
    }

    async fn visit(&mut self, block: &ContentBlock, ctx: RenderContext<'_>) -> Result<(), ExportError> {
        let ty = block.block_type();

        if ty != BlockType::TableRow {
            trim_dangling_table_separator(&mut self.out);
        }

        let fragment = self.renderer.render(block, &ctx, &mut self.warnings).await?;

        if ty.is_omitted() {
            // Layout containers such as columns still hold page content.
            if block.has_children && !ty.is_document_boundary() {
                self.visit_children(block.id, ctx.descend(ty)).await?;
            }
            return Ok(());
        }

        self.out.push_str(&place(&fragment.markup, ty, &ctx));
        self.out.push_str(terminator(&fragment.markup, ty, &ctx));

        if block.has_children {
            self.visit_children(block.id, ctx.descend(ty)).await?;
        }

        if let Some(bracket) = fragment.close {
            self.out.push_str(&close(bracket, &ctx));
        }
        Ok(())
    }
}
