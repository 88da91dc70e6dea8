//! Markdown rendering and plain-text summaries.

use pulldown_cmark::{Event, Options, Parser, TagEnd, html};

pub const ELLIPSIS: &str = "...";

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Text content of the rendered document with whitespace collapsed.
pub fn plain_text(markdown: &str) -> String {
    let mut text = String::with_capacity(markdown.len());
    for event in Parser::new_ext(markdown, options()) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak
            | Event::HardBreak
            | Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::Item)
            | Event::End(TagEnd::CodeBlock)
            | Event::End(TagEnd::TableCell) => text.push(' '),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `limit` characters of the plain text, with [`ELLIPSIS`] appended
/// when anything was cut. Word boundaries are ignored.
pub fn summarize(markdown: &str, limit: usize) -> String {
    let text = plain_text(markdown);
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text,
    }
}
