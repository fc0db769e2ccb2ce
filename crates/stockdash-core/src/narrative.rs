//! Lightweight markup for the AI narrative.
//!
//! The narrative arrives as plain text using a tiny subset of Markdown:
//!
//! - a blank line separates paragraphs
//! - a single newline inside a paragraph is a line break
//! - `**text**` is emphasis
//! - a line starting with `* ` is a list item; consecutive items share one list
//!
//! Lists never nest. A line that is not an item closes the current list, so
//! bullets separated by prose produce separate lists.

use serde::{Deserialize, Serialize};

/// Inline content of a paragraph or list item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inline {
    /// Plain text.
    Text(String),
    /// Emphasized text.
    Emphasis(String),
    /// Line break inside a paragraph.
    LineBreak,
}

/// A block of narrative content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    /// A paragraph.
    Paragraph(Vec<Inline>),
    /// A bulleted list; one entry per item.
    List(Vec<Vec<Inline>>),
}

#[derive(Debug, Default)]
struct Builder {
    blocks: Vec<Block>,
    paragraph: Vec<Inline>,
    items: Vec<Vec<Inline>>,
}

impl Builder {
    fn close_paragraph(&mut self) {
        if !self.paragraph.is_empty() {
            self.blocks
                .push(Block::Paragraph(std::mem::take(&mut self.paragraph)));
        }
    }

    fn close_list(&mut self) {
        if !self.items.is_empty() {
            self.blocks.push(Block::List(std::mem::take(&mut self.items)));
        }
    }

    fn push_line(&mut self, line: &str) {
        if !self.paragraph.is_empty() {
            self.paragraph.push(Inline::LineBreak);
        }
        self.paragraph.extend(parse_inline(line));
    }

    fn finish(mut self) -> Vec<Block> {
        self.close_paragraph();
        self.close_list();
        self.blocks
    }
}

/// Parses narrative text into blocks.
#[must_use]
pub fn parse_narrative(text: &str) -> Vec<Block> {
    let mut builder = Builder::default();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            builder.close_paragraph();
            builder.close_list();
        } else if let Some(item) = line.trim_start().strip_prefix("* ") {
            builder.close_paragraph();
            builder.items.push(parse_inline(item.trim()));
        } else {
            builder.close_list();
            builder.push_line(trimmed);
        }
    }

    builder.finish()
}

/// Splits a line into text and emphasis spans.
///
/// A `**` without a matching close, or enclosing nothing or another `*`, is
/// kept literally.
#[must_use]
pub fn parse_inline(line: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut text = String::new();
    let mut rest = line;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        match after.find("**") {
            Some(end) if end > 0 && !after[..end].contains('*') => {
                text.push_str(&rest[..start]);
                if !text.is_empty() {
                    out.push(Inline::Text(std::mem::take(&mut text)));
                }
                out.push(Inline::Emphasis(after[..end].to_string()));
                rest = &after[end + 2..];
            }
            _ => {
                text.push_str(&rest[..start + 2]);
                rest = after;
            }
        }
    }

    text.push_str(rest);
    if !text.is_empty() {
        out.push(Inline::Text(text));
    }
    out
}

/// Renders blocks as HTML, escaping all text.
#[must_use]
pub fn to_html(blocks: &[Block]) -> String {
    let mut html = String::new();
    for block in blocks {
        match block {
            Block::Paragraph(inlines) => {
                html.push_str("<p>");
                push_inlines(&mut html, inlines);
                html.push_str("</p>");
            }
            Block::List(items) => {
                html.push_str("<ul>");
                for item in items {
                    html.push_str("<li>");
                    push_inlines(&mut html, item);
                    html.push_str("</li>");
                }
                html.push_str("</ul>");
            }
        }
    }
    html
}

/// Renders blocks as plain text without markup.
#[must_use]
pub fn to_plain_text(blocks: &[Block]) -> String {
    let rendered: Vec<String> = blocks
        .iter()
        .map(|block| match block {
            Block::Paragraph(inlines) => plain(inlines),
            Block::List(items) => items
                .iter()
                .map(|item| format!("- {}", plain(item)))
                .collect::<Vec<_>>()
                .join("\n"),
        })
        .collect();
    rendered.join("\n\n")
}

fn plain(inlines: &[Inline]) -> String {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(t) | Inline::Emphasis(t) => t.as_str(),
            Inline::LineBreak => "\n",
        })
        .collect()
}

fn push_inlines(html: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text(t) => push_escaped(html, t),
            Inline::Emphasis(t) => {
                html.push_str("<strong>");
                push_escaped(html, t);
                html.push_str("</strong>");
            }
            Inline::LineBreak => html.push_str("<br>"),
        }
    }
}

fn push_escaped(html: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => html.push_str("&amp;"),
            '<' => html.push_str("&lt;"),
            '>' => html.push_str("&gt;"),
            '"' => html.push_str("&quot;"),
            '\'' => html.push_str("&#39;"),
            c => html.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn em(s: &str) -> Inline {
        Inline::Emphasis(s.to_string())
    }

    #[test]
    fn test_paragraphs_and_line_breaks() {
        let blocks = parse_narrative("First line\nsecond line\n\nNext paragraph");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![text("First line"), Inline::LineBreak, text("second line")]),
                Block::Paragraph(vec![text("Next paragraph")]),
            ]
        );
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(
            parse_inline("The **P/E ratio** looks **high**."),
            vec![text("The "), em("P/E ratio"), text(" looks "), em("high"), text(".")]
        );
        assert_eq!(parse_inline("unterminated **bold"), vec![text("unterminated **bold")]);
        assert_eq!(parse_inline("****"), vec![text("****")]);
    }

    #[test]
    fn test_contiguous_items_share_one_list() {
        let blocks = parse_narrative("**Strengths:**\n* Strong margins\n* Low debt\n\nOverall solid.");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![em("Strengths:")]),
                Block::List(vec![vec![text("Strong margins")], vec![text("Low debt")]]),
                Block::Paragraph(vec![text("Overall solid.")]),
            ]
        );
    }

    #[test]
    fn test_non_contiguous_items_make_separate_flat_lists() {
        let blocks = parse_narrative("* one\nbetween\n* two\n\n* three");
        assert_eq!(
            blocks,
            vec![
                Block::List(vec![vec![text("one")]]),
                Block::Paragraph(vec![text("between")]),
                Block::List(vec![vec![text("two")]]),
                Block::List(vec![vec![text("three")]]),
            ]
        );
        let html = to_html(&blocks);
        assert_eq!(html.matches("<ul>").count(), 3);
        assert_eq!(html.matches("</ul>").count(), 3);
        assert!(!html.contains("<ul><ul>"));
    }

    #[test]
    fn test_indented_item_and_bare_star() {
        let blocks = parse_narrative("   * indented item\n*not an item");
        assert_eq!(
            blocks,
            vec![
                Block::List(vec![vec![text("indented item")]]),
                Block::Paragraph(vec![text("*not an item")]),
            ]
        );
    }

    #[test]
    fn test_html_escapes_text() {
        let html = to_html(&parse_narrative("Revenue <b>&</b> **\"growth\"**"));
        assert_eq!(
            html,
            "<p>Revenue &lt;b&gt;&amp;&lt;/b&gt; <strong>&quot;growth&quot;</strong></p>"
        );
    }

    #[test]
    fn test_plain_text() {
        let blocks = parse_narrative("Intro **now**\n* a\n* b");
        assert_eq!(to_plain_text(&blocks), "Intro now\n\n- a\n- b");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_narrative("").is_empty());
        assert!(parse_narrative("\n\n  \n").is_empty());
        assert_eq!(to_html(&[]), "");
    }
}
