//! Block renderer: one content block to one markup fragment.
//!
//! The renderer only sees the block and its position. Closing brackets of
//! lists, toggles and tables are reported through [`Fragment::close`] and
//! emitted by the tree walker once the block's children are done.

use crate::domain::content::{BlockKind, BlockType, ContentBlock, FileSource, Icon, Media, RichText};
use crate::ports::{AssetError, AssetResolver};

use super::layout::indent;
use super::rich_text::{render_rich_text, render_table_cell};
use super::{RenderContext, WarningLog};

const DRIVE_ICON: &str = "https://s3-us-west-2.amazonaws.com/public.notion-static.com/8fb58690-ee50-4584-b9fd-ca9b524f56aa/google-drive-icon-19632.png";
const FIGMA_ICON: &str = "https://www.notion.so/images/external_integrations/figma-icon.png";
const GITHUB_ICON: &str = "https://www.notion.so/images/external_integrations/github-icon.png";

const INLINE_ICON_STYLE: &str = "height: 1.5em; vertical-align: middle;";

/// Structural bracket left open by a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    BulletedList,
    NumberedList,
    Toggle,
    Table,
}

/// Rendered markup of one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub markup: String,
    /// Bracket to close after the block's children.
    pub close: Option<Bracket>,
}

impl Fragment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            close: None,
        }
    }

    fn closed_by(markup: impl Into<String>, bracket: Option<Bracket>) -> Self {
        Self {
            markup: markup.into(),
            close: bracket,
        }
    }
}

/// Renders blocks, fetching uploaded assets through an [`AssetResolver`].
pub struct BlockRenderer<'r> {
    assets: &'r dyn AssetResolver,
}

impl<'r> BlockRenderer<'r> {
    pub fn new(assets: &'r dyn AssetResolver) -> Self {
        Self { assets }
    }

    /// Renders `block` at `ctx`.
    ///
    /// Omitted block types produce an empty fragment and a warning entry for
    /// the page. An asset failure aborts the block.
    pub async fn render(
        &self,
        block: &ContentBlock,
        ctx: &RenderContext<'_>,
        warnings: &mut WarningLog,
    ) -> Result<Fragment, AssetError> {
        let ty = block.block_type();

        if ty.is_omitted() {
            let scope = ctx.scope;
            if warnings.record(scope.page_id, &scope.page_title, ty) {
                match &block.kind {
                    BlockKind::Unsupported { reported_type } => tracing::warn!(
                        page_id = %scope.page_id,
                        block_type = %reported_type,
                        "Omitting unsupported block type"
                    ),
                    _ => tracing::warn!(
                        page_id = %scope.page_id,
                        block_type = %ty,
                        "Omitting block type"
                    ),
                }
            }
            return Ok(Fragment::empty());
        }

        let mut fragment = self.render_kind(block, ctx).await?;

        if ty.supports_caption() {
            if let Some(caption) = block.kind.caption().filter(|c| !c.is_empty()) {
                let caption = render_rich_text(caption, ctx.syntax);
                fragment.markup = if ctx.syntax.is_rich() {
                    format!(
                        "<figure>\n{}\n\t<figcaption>{}</figcaption>\n</figure>",
                        indent(&fragment.markup, 1, ctx.syntax),
                        caption
                    )
                } else {
                    format!("{}\n{}", fragment.markup, caption)
                };
            }
        }

        Ok(fragment)
    }

    async fn render_kind(
        &self,
        block: &ContentBlock,
        ctx: &RenderContext<'_>,
    ) -> Result<Fragment, AssetError> {
        let syntax = ctx.syntax;
        let rich = syntax.is_rich();
        let text = |spans: &RichText| render_rich_text(spans, syntax);

        let fragment = match &block.kind {
            BlockKind::Paragraph { text: t }
            | BlockKind::Template { text: t }
            | BlockKind::SyncedBlock { text: t } => Fragment::new(text(t)),

            BlockKind::Heading1 { text: t } => Fragment::new(heading(1, &text(t), rich)),
            BlockKind::Heading2 { text: t } => Fragment::new(heading(2, &text(t), rich)),
            BlockKind::Heading3 { text: t } => Fragment::new(heading(3, &text(t), rich)),

            BlockKind::BulletedListItem { text: t } | BlockKind::NumberedListItem { text: t } => {
                list_item(block.block_type(), &text(t), ctx)
            }

            BlockKind::Quote { text: t } => {
                let t = text(t);
                if rich {
                    Fragment::new(format!("<blockquote>\n{}\n</blockquote>", t))
                } else {
                    Fragment::new(quote_lines(&t))
                }
            }

            BlockKind::ToDo { text: t, checked } => {
                let t = text(t);
                if rich {
                    Fragment::new(format!(
                        "<label style=\"margin-inline-start: {}px;\">\n\t<input type=\"checkbox\"{} />{}\n</label>",
                        ctx.depth * 20,
                        if *checked { " checked" } else { "" },
                        t
                    ))
                } else {
                    let mark = if *checked { "x" } else { " " };
                    Fragment::new(indent(&format!("- [{}] {}", mark, t), ctx.depth, syntax))
                }
            }

            BlockKind::Toggle { text: t } => Fragment::closed_by(
                format!(
                    "{}\n{}",
                    indent("<details>", ctx.depth, syntax),
                    indent(&format!("<summary>{}</summary>", text(t)), ctx.depth + 1, syntax)
                ),
                Some(Bracket::Toggle),
            ),

            BlockKind::Equation { expression } => Fragment::new(format!("$$\n{}\n$$", expression)),

            BlockKind::Code { text: t, language, .. } => {
                let code = crate::domain::content::plain_text_of(t);
                if rich {
                    Fragment::new(format!(
                        "<pre><code class=\"{}\">\n{}\n</code></pre>",
                        language.replace(' ', "-"),
                        escape_html(&code)
                    ))
                } else {
                    Fragment::new(format!("```{}\n{}\n```", fence_language(language), code))
                }
            }

            BlockKind::Callout { text: t, icon } => {
                let t = text(t);
                let icon = match icon {
                    None => None,
                    Some(Icon::Emoji(emoji)) => Some(CalloutIcon::Glyph(emoji.clone())),
                    Some(Icon::External(url)) | Some(Icon::CustomEmoji(url)) => {
                        Some(CalloutIcon::Image(url.clone()))
                    }
                    Some(Icon::File(url)) => {
                        let reference = self
                            .assets
                            .resolve(&ctx.scope.source_folder, &ctx.scope.asset_owner(&block.id), url)
                            .await?;
                        Some(CalloutIcon::Image(reference.encoded()))
                    }
                };
                Fragment::new(callout(icon, &t, rich))
            }

            BlockKind::Divider => Fragment::new("---"),

            BlockKind::Table { .. } => Fragment::closed_by("", Some(Bracket::Table)),

            BlockKind::TableRow { cells } => {
                let mut row: String = cells
                    .iter()
                    .map(|cell| format!("| {} ", render_table_cell(cell, syntax)))
                    .collect();
                row.push('|');
                if ctx.sibling_index == 0 {
                    row.push('\n');
                    row.push_str(&"| --- ".repeat(cells.len()));
                    row.push('|');
                }
                Fragment::new(row)
            }

            BlockKind::Embed { url, .. } => {
                if rich {
                    Fragment::new(format!("<embed src=\"{}\" />", url))
                } else {
                    Fragment::new(format!("[{}]({})", last_segment(url), url))
                }
            }

            BlockKind::Bookmark { url, .. } => {
                let host = host_of(url).unwrap_or_else(|| url.clone());
                if rich {
                    Fragment::new(format!("<a href=\"{}\">{}</a>", url, host))
                } else {
                    Fragment::new(format!("[{}]({})", host, url))
                }
            }

            BlockKind::Image(media) => {
                let (url, _) = self.media_target(block, media, ctx).await?;
                if rich {
                    Fragment::new(format!("<img src=\"{}\" alt=\"{}\" />", url, url))
                } else {
                    Fragment::new(format!("![]({})", url))
                }
            }

            BlockKind::Video(media) => {
                let (url, title) = self.media_target(block, media, ctx).await?;
                if !rich {
                    Fragment::new(format!("[{}]({})", title, url))
                } else if media.source.is_hosted() {
                    Fragment::new(format!("<video controls>\n\t<source src=\"{}\" />\n</video>", url))
                } else {
                    Fragment::new(format!("<iframe src=\"{}\" />", url))
                }
            }

            BlockKind::Pdf(media) => {
                let (url, title) = self.media_target(block, media, ctx).await?;
                if !rich {
                    Fragment::new(format!("[{}]({})", title, url))
                } else if media.source.is_hosted() {
                    Fragment::new(format!("<iframe src=\"{}\" />", url))
                } else {
                    Fragment::new(format!(
                        "<iframe src=\"https://docs.google.com/viewer?url={}&embedded=true\" />",
                        urlencoding::encode(&url)
                    ))
                }
            }

            BlockKind::File(media) => {
                let (url, title) = self.media_target(block, media, ctx).await?;
                let title = media
                    .name
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .unwrap_or(title);
                if rich {
                    Fragment::new(format!("<a href=\"{}\">{}</a>", url, title))
                } else {
                    Fragment::new(format!("[{}]({})", title, url))
                }
            }

            BlockKind::Audio(media) => {
                let (url, title) = self.media_target(block, media, ctx).await?;
                if rich {
                    Fragment::new(format!("<audio controls>\n\t<source src=\"{}\" />\n</audio>", url))
                } else {
                    Fragment::new(format!("[{}]({})", title, url))
                }
            }

            BlockKind::LinkPreview { url } => Fragment::new(link_preview(url, rich)),

            BlockKind::ChildPage { .. }
            | BlockKind::ChildDatabase { .. }
            | BlockKind::Breadcrumb
            | BlockKind::TableOfContents
            | BlockKind::ColumnList
            | BlockKind::Column
            | BlockKind::LinkToPage { .. }
            | BlockKind::Unsupported { .. } => Fragment::empty(),
        };

        Ok(fragment)
    }

    /// Link target and display title of a media block. Uploaded files are
    /// downloaded first.
    async fn media_target(
        &self,
        block: &ContentBlock,
        media: &Media,
        ctx: &RenderContext<'_>,
    ) -> Result<(String, String), AssetError> {
        match &media.source {
            FileSource::External { url } => Ok((url.clone(), last_segment(url))),
            FileSource::Hosted { url } => {
                let reference = self
                    .assets
                    .resolve(&ctx.scope.source_folder, &ctx.scope.asset_owner(&block.id), url)
                    .await?;
                Ok((reference.encoded(), reference.file_name().to_string()))
            }
        }
    }
}

fn heading(level: u8, text: &str, rich: bool) -> String {
    if rich {
        format!("<h{level}>{text}</h{level}>")
    } else {
        format!("{} {}", "#".repeat(level as usize), text)
    }
}

/// List item markup. The container opens at the first item of a run of
/// same-type siblings and closes after the last one.
fn list_item(ty: BlockType, text: &str, ctx: &RenderContext<'_>) -> Fragment {
    let numbered = ty == BlockType::NumberedListItem;
    let bracket = if numbered {
        Bracket::NumberedList
    } else {
        Bracket::BulletedList
    };
    let close = ctx.ends_run(ty).then_some(bracket);

    if !ctx.syntax.is_rich() {
        let marker = if numbered { "1." } else { "-" };
        return Fragment::closed_by(indent(&format!("{} {}", marker, text), ctx.depth, ctx.syntax), close);
    }

    let item = indent(&format!("<li>{}</li>", text), ctx.depth + 1, ctx.syntax);
    let markup = if ctx.starts_run(ty) {
        let open = if numbered { "<ol>" } else { "<ul>" };
        format!("{}\n{}", indent(open, ctx.depth, ctx.syntax), item)
    } else {
        item
    };
    Fragment::closed_by(markup, close)
}

enum CalloutIcon {
    Glyph(String),
    Image(String),
}

fn callout(icon: Option<CalloutIcon>, text: &str, rich: bool) -> String {
    if rich {
        let body = match icon {
            None => text.to_string(),
            Some(CalloutIcon::Glyph(glyph)) => format!("{} {}", glyph, text),
            Some(CalloutIcon::Image(url)) => format!(
                "<img src=\"{url}\" alt=\"{url}\" style=\"{INLINE_ICON_STYLE}\" />{text}"
            ),
        };
        return format!("<aside>\n\t{}\n</aside>", body);
    }

    let body = match icon {
        None => text.to_string(),
        Some(CalloutIcon::Glyph(glyph)) => format!("{} {}", glyph, text),
        Some(CalloutIcon::Image(url)) => format!("![]({}) {}", url, text),
    };
    quote_lines(&body)
}

fn link_preview(url: &str, rich: bool) -> String {
    let title = last_segment(url);
    let icon = host_of(url).and_then(|host| preview_icon(&host));
    let icon_tag = icon.map(|icon| {
        format!("<img src=\"{icon}\" alt=\"{icon}\" style=\"{INLINE_ICON_STYLE}\" />")
    });

    match (rich, icon_tag) {
        (true, Some(tag)) => format!("<a href=\"{}\">\n\t{}{}\n</a>", url, tag, title),
        (true, None) => format!("<a href=\"{}\">{}</a>", url, title),
        (false, Some(tag)) => format!("[{}{}]({})", tag, title, url),
        (false, None) => format!("[{}]({})", title, url),
    }
}

/// Provider icon for known link preview hosts.
fn preview_icon(host: &str) -> Option<&'static str> {
    let matches = |domain: &str| host == domain || host.ends_with(&format!(".{}", domain));
    if matches("drive.google.com") {
        Some(DRIVE_ICON)
    } else if matches("figma.com") {
        Some(FIGMA_ICON)
    } else if matches("github.com") {
        Some(GITHUB_ICON)
    } else {
        None
    }
}

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Last non-empty path segment of a URL, or the URL itself.
fn last_segment(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .unwrap_or_else(|| url.to_string())
}

fn quote_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| format!("> {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn fence_language(language: &str) -> String {
    match language {
        "plain text" => "text".to_string(),
        other => other.replace(' ', "-"),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
