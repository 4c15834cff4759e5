//! Placement of rendered fragments in the page buffer: indentation, line
//! termination, closing brackets and the table separator fixup.

use crate::domain::content::BlockType;

use super::{Bracket, OutputSyntax, RenderContext};

const TABLE_SEPARATOR_CELL: &str = "| --- ";

/// Prefixes every non-empty line of `text` with `depth` indentation units.
pub fn indent(text: &str, depth: usize, syntax: OutputSyntax) -> String {
    if depth == 0 {
        return text.to_string();
    }
    let prefix = syntax.indent_unit().repeat(depth);
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Types that indent their own markup.
fn is_self_indenting(ty: BlockType) -> bool {
    ty.is_indentable()
}

/// Positions a rendered fragment for its depth and parent.
pub fn place(markup: &str, ty: BlockType, ctx: &RenderContext<'_>) -> String {
    if markup.is_empty() || is_self_indenting(ty) {
        return markup.to_string();
    }

    if ctx.is_nested_content(ty) && ctx.syntax.is_rich() {
        let wrapped = format!(
            "<div style=\"margin-inline-start: {}px\">{}</div>",
            ctx.depth * 20,
            markup
        );
        return indent(&wrapped, ctx.depth, ctx.syntax);
    }

    indent(markup, ctx.depth, ctx.syntax)
}

/// Line ending appended after a placed fragment.
pub fn terminator(markup: &str, ty: BlockType, ctx: &RenderContext<'_>) -> &'static str {
    if ty == BlockType::Table {
        return "";
    }
    if markup.is_empty() || ctx.is_nested_content(ty) || ty.is_line_break() {
        return "\n";
    }
    if ctx.parent_type.map_or(false, |p| p.is_line_break()) {
        return "\n";
    }
    "\n\n"
}

/// Markup closing a bracket opened by a block at `ctx`.
pub fn close(bracket: Bracket, ctx: &RenderContext<'_>) -> String {
    let tail = if ctx.inside_container() { "\n" } else { "\n\n" };
    match bracket {
        Bracket::BulletedList | Bracket::NumberedList if !ctx.syntax.is_rich() => {
            if ctx.inside_container() {
                String::new()
            } else {
                "\n".to_string()
            }
        }
        Bracket::BulletedList => format!("{}{}", indent("</ul>", ctx.depth, ctx.syntax), tail),
        Bracket::NumberedList => format!("{}{}", indent("</ol>", ctx.depth, ctx.syntax), tail),
        Bracket::Toggle => format!("{}{}", indent("</details>", ctx.depth, ctx.syntax), tail),
        Bracket::Table => "\n".to_string(),
    }
}

/// Removes a header separator line left dangling at the end of the buffer by
/// a table with a single row. Only the last line is considered, and only
/// when the line before it is a table row at the same indentation.
pub fn trim_dangling_table_separator(out: &mut String) {
    let body_end = out.trim_end().len();
    let Some(separator_break) = out[..body_end].rfind('\n') else {
        return;
    };
    let separator = &out[separator_break + 1..body_end];
    if !is_separator_line(separator.trim_start()) {
        return;
    }

    let row_start = out[..separator_break].rfind('\n').map_or(0, |i| i + 1);
    let row = &out[row_start..separator_break];
    let indentation = &separator[..separator.len() - separator.trim_start().len()];
    let row_cells = row.strip_prefix(indentation).unwrap_or_default();
    if row_cells.starts_with(char::is_whitespace)
        || !row_cells.starts_with('|')
        || !row_cells.ends_with('|')
        || is_separator_line(row_cells)
        || column_count(row_cells) != separator.trim_start().len() / TABLE_SEPARATOR_CELL.len()
    {
        return;
    }

    let tail = out[body_end..].to_string();
    out.truncate(separator_break);
    out.push_str(&tail);
}

/// Number of cells in a rendered row. Pipes inside cells are escaped.
fn column_count(row: &str) -> usize {
    let mut escaped = false;
    let mut pipes: usize = 0;
    for c in row.chars() {
        if c == '|' && !escaped {
            pipes += 1;
        }
        escaped = c == '\\' && !escaped;
    }
    pipes.saturating_sub(1)
}

/// True for a line made only of `| --- ` cells closed by `|`.
fn is_separator_line(line: &str) -> bool {
    let Some(cells) = line.strip_suffix('|') else {
        return false;
    };
    !cells.is_empty()
        && cells.len() % TABLE_SEPARATOR_CELL.len() == 0
        && cells
            .as_bytes()
            .chunks(TABLE_SEPARATOR_CELL.len())
            .all(|cell| cell == TABLE_SEPARATOR_CELL.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{PageId, SourceId};
    use crate::domain::rendering::DocumentScope;

    fn scope() -> DocumentScope {
        DocumentScope {
            source_id: SourceId::new(),
            source_folder: "Projects".into(),
            page_id: PageId::new(),
            page_title: "Launch".into(),
            page_stem: "Launch".into(),
        }
    }

    #[test]
    fn indent_skips_blank_lines() {
        assert_eq!(indent("a\n\nb", 2, OutputSyntax::Rich), "\t\ta\n\n\t\tb");
        assert_eq!(indent("a", 1, OutputSyntax::Plain), "    a");
        assert_eq!(indent("a", 0, OutputSyntax::Plain), "a");
    }

    #[test]
    fn nested_content_is_wrapped_in_rich_mode() {
        let scope = scope();
        let ctx = RenderContext::root(&scope, OutputSyntax::Rich).descend(BlockType::Toggle);
        assert_eq!(
            place("hi", BlockType::Paragraph, &ctx),
            "\t<div style=\"margin-inline-start: 20px\">hi</div>"
        );
        assert_eq!(terminator("hi", BlockType::Paragraph, &ctx), "\n");
    }

    #[test]
    fn nested_content_is_indented_in_plain_mode() {
        let scope = scope();
        let ctx = RenderContext::root(&scope, OutputSyntax::Plain).descend(BlockType::BulletedListItem);
        assert_eq!(place("hi\nthere", BlockType::Paragraph, &ctx), "    hi\n    there");
    }

    #[test]
    fn top_level_paragraph_gets_paragraph_break() {
        let scope = scope();
        let ctx = RenderContext::root(&scope, OutputSyntax::Rich);
        assert_eq!(place("hi", BlockType::Paragraph, &ctx), "hi");
        assert_eq!(terminator("hi", BlockType::Paragraph, &ctx), "\n\n");
        assert_eq!(terminator("", BlockType::Paragraph, &ctx), "\n");
        assert_eq!(terminator("", BlockType::Table, &ctx), "");
    }

    #[test]
    fn table_rows_end_with_single_line_break() {
        let scope = scope();
        let ctx = RenderContext::root(&scope, OutputSyntax::Rich).descend(BlockType::Table);
        assert_eq!(terminator("| a |", BlockType::TableRow, &ctx), "\n");
    }

    #[test]
    fn root_and_nested_toggle_close() {
        let scope = scope();
        let root = RenderContext::root(&scope, OutputSyntax::Rich);
        assert_eq!(close(Bracket::Toggle, &root), "</details>\n\n");
        let nested = root.descend(BlockType::Toggle);
        assert_eq!(close(Bracket::Toggle, &nested), "\t</details>\n");
    }

    #[test]
    fn plain_lists_close_with_blank_line_at_top_level() {
        let scope = scope();
        let root = RenderContext::root(&scope, OutputSyntax::Plain);
        assert_eq!(close(Bracket::BulletedList, &root), "\n");
        let nested = root.descend(BlockType::BulletedListItem);
        assert_eq!(close(Bracket::NumberedList, &nested), "");
    }

    #[test]
    fn dangling_separator_is_trimmed() {
        let mut out = String::from("intro\n\n| a | b |\n| --- | --- |\n\n");
        trim_dangling_table_separator(&mut out);
        assert_eq!(out, "intro\n\n| a | b |\n\n");
    }

    #[test]
    fn table_with_body_is_left_alone() {
        let original = "| a | b |\n| --- | --- |\n| c | d |\n\n";
        let mut out = String::from(original);
        trim_dangling_table_separator(&mut out);
        assert_eq!(out, original);
    }

    #[test]
    fn nested_dangling_separator_is_trimmed_on_its_own_line() {
        let mut out = String::from(
            "| a | b |\n| --- | --- |\n| c | d |\n\n<details>\n\t<summary>T</summary>\n\t| only |\n\t| --- |\n\n",
        );
        trim_dangling_table_separator(&mut out);
        assert_eq!(
            out,
            "| a | b |\n| --- | --- |\n| c | d |\n\n<details>\n\t<summary>T</summary>\n\t| only |\n\n"
        );
    }

    #[test]
    fn separator_without_row_above_is_left_alone() {
        let original = "intro\n\t| --- |\n\n";
        let mut out = String::from(original);
        trim_dangling_table_separator(&mut out);
        assert_eq!(out, original);

        let mut lone = String::from("| --- |\n");
        trim_dangling_table_separator(&mut lone);
        assert_eq!(lone, "| --- |\n");
    }

    #[test]
    fn separator_must_match_row_width() {
        let original = "| a\\|b |\n| --- | --- |\n\n";
        let mut out = String::from(original);
        trim_dangling_table_separator(&mut out);
        assert_eq!(out, original);

        let mut single = String::from("| a\\|b |\n| --- |\n\n");
        trim_dangling_table_separator(&mut single);
        assert_eq!(single, "| a\\|b |\n\n");
    }

    #[test]
    fn text_ending_in_dashes_is_not_a_separator() {
        let original = "| a |\nsee | --- |\n\n";
        let mut out = String::from(original);
        trim_dangling_table_separator(&mut out);
        assert_eq!(out, original);
    }
}
