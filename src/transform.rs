//! Markup-to-prose transformation.
//!
//! Converts a chunk's HTML into clean text, preserving reading order and
//! dropping navigation/boilerplate subtrees. This is a pure function; it runs
//! between splitting and embedding.

use scraper::{ElementRef, Html};

/// Subtrees that never carry document prose.
const SKIPPED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside", "noscript"];

/// Tags after which a line break keeps reading order legible.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "br", "table", "tr",
    "blockquote",
];

/// Converts an HTML fragment into clean prose text.
pub fn html_to_prose(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut raw = String::new();
    walk(fragment.root_element(), &mut raw);
    normalize(&raw)
}

fn walk(element: ElementRef, out: &mut String) {
    let name = element.value().name();
    if SKIPPED_TAGS.contains(&name) {
        return;
    }
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            walk(child_el, out);
        }
    }
    if BLOCK_TAGS.contains(&name) {
        out.push('\n');
    }
}

/// Collapses whitespace runs and drops empty lines.
fn normalize(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
