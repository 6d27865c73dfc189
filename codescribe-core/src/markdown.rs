//! Markdown to a standalone HTML document, ready for an external PDF renderer.

use pulldown_cmark::{html, Options, Parser};
use tracing::debug;

const STYLE: &str = "body { font-family: sans-serif; margin: 2em; line-height: 1.4; }\n\
pre, code { font-family: monospace; background: #f4f4f4; }\n\
pre { padding: 0.6em; white-space: pre-wrap; }\n\
table { border-collapse: collapse; }\n\
td, th { border: 1px solid #ccc; padding: 0.3em 0.6em; }\n";

/// Convert Markdown to an HTML fragment.
pub fn markdown_to_html_fragment(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Convert Markdown to a complete HTML document with a minimal stylesheet.
pub fn markdown_to_html(markdown: &str, title: &str) -> String {
    let body = markdown_to_html_fragment(markdown);
    debug!(markdown_bytes = markdown.len(), html_bytes = body.len(), "Converted markdown to HTML");
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
