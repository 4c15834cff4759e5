//! Rich text renderer: inline spans to markup.
//!
//! Each span is rendered on its own and the results are concatenated in the
//! order received. Annotations wrap the text in a fixed order (bold, italic,
//! strikethrough, underline, code) so that later annotations nest outward. A
//! link wraps the annotated text last.

use crate::domain::content::{RichTextSpan, SpanContent};

use super::OutputSyntax;

/// Renders a sequence of spans.
pub fn render_rich_text(spans: &[RichTextSpan], syntax: OutputSyntax) -> String {
    spans.iter().map(|span| render_span(span, syntax)).collect()
}

/// Renders the spans of a table cell, escaping column separators.
pub fn render_table_cell(spans: &[RichTextSpan], syntax: OutputSyntax) -> String {
    render_rich_text(spans, syntax).replace('|', "\\|")
}

/// Renders one span.
pub fn render_span(span: &RichTextSpan, syntax: OutputSyntax) -> String {
    let text = match &span.content {
        SpanContent::Text(text) => text.clone(),
        SpanContent::Equation(expression) => format!("${}$", expression),
        SpanContent::Mention { plain_text } => plain_text.clone(),
    };

    // Plain delimiters wrap only the text between outer whitespace.
    let (leading, core, trailing) = if syntax.is_rich() {
        ("", text.as_str(), "")
    } else {
        split_outer_whitespace(&text)
    };

    let a = span.annotations;
    let wrappers = [
        (a.bold, ("<b>", "</b>"), ("**", "**")),
        (a.italic, ("<i>", "</i>"), ("*", "*")),
        (a.strikethrough, ("<s>", "</s>"), ("~~", "~~")),
        (a.underline, ("<u>", "</u>"), ("", "")),
        (a.code, ("<code>", "</code>"), ("`", "`")),
    ];

    let mut styled = core.to_string();
    if syntax.is_rich() || !core.is_empty() {
        for (enabled, rich, plain) in wrappers {
            if !enabled {
                continue;
            }
            let (open, close) = if syntax.is_rich() { rich } else { plain };
            styled = format!("{}{}{}", open, styled, close);
        }
    }
    let mut rendered = format!("{}{}{}", leading, styled, trailing);

    if let Some(url) = &span.link {
        rendered = format!("[{}]({})", rendered, url);
    }

    rendered
}

/// Splits `text` into leading whitespace, the text between, and trailing
/// whitespace.
fn split_outer_whitespace(text: &str) -> (&str, &str, &str) {
    let start = text.len() - text.trim_start().len();
    let end = start + text[start..].trim_end().len();
    (&text[..start], &text[start..end], &text[end..])
}
