// src/extractors/normalize.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{node::Node, ElementRef, Html};

// Elements whose text never counts as visible page text
const SKIPPED_ELEMENTS: [&str; 2] = ["script", "style"];

// Rating badges are only trusted in this leading fraction of the text
const RATING_WINDOW_DIVISOR: usize = 4;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RE")
});

// <noscript> content arrives as one raw-text node with its markup intact
static RAW_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]+>").expect("Failed to compile RAW_TAG_RE")
});

/// One page, parsed once and shared by the structured and heuristic passes.
pub struct NormalizedPage<'a> {
    pub raw_html: &'a str,
    pub document: Html,
    pub text: String,
}

impl<'a> NormalizedPage<'a> {
    pub fn parse(raw_html: &'a str) -> Self {
        let document = Html::parse_document(raw_html);
        let text = visible_text(&document);
        tracing::debug!("Normalized {} bytes of HTML into {} bytes of text", raw_html.len(), text.len());
        Self { raw_html, document, text }
    }

    /// Leading quarter of the text, cut on a character boundary.
    pub fn rating_window(&self) -> &str {
        let limit = self.text.chars().count() / RATING_WINDOW_DIVISOR;
        match self.text.char_indices().nth(limit) {
            Some((byte_index, _)) => &self.text[..byte_index],
            None => &self.text,
        }
    }
}

/// Flattens raw HTML into a single line of searchable text.
pub fn normalize(html: &str) -> String {
    visible_text(&Html::parse_document(html))
}

fn visible_text(document: &Html) -> String {
    let mut raw = String::new();
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let mut in_noscript = false;
        let mut hidden = false;
        for el in node.ancestors().filter_map(ElementRef::wrap) {
            let name = el.value().name();
            hidden |= SKIPPED_ELEMENTS.contains(&name);
            in_noscript |= name == "noscript";
        }
        if hidden {
            continue;
        }
        // Tags act as word separators
        raw.push(' ');
        if in_noscript {
            raw.push_str(&RAW_TAG_RE.replace_all(text, " "));
        } else {
            raw.push_str(text);
        }
    }
    collapse_whitespace(&raw)
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}
