//! Report rendering.
//!
//! Reports are written by a model that read arbitrary web pages, so raw HTML
//! in the markdown is shown as text rather than passed through.

use pulldown_cmark::{Event, Options, Parser, html};

/// Render a markdown report to HTML
pub fn render_report(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
