// src/extractors/structured.rs

use crate::extractors::fact_sheet::FactSheet;
use crate::extractors::normalize::NormalizedPage;
use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use serde_json::{Map, Value};

// Corporation descriptions at or below this many characters are boilerplate
const MIN_DESCRIPTION_CHARS: usize = 20;

// FAQ questions mentioning any of these carry the investment thesis
const THESIS_QUESTION_KEYWORDS: [&str; 3] = ["invest", "thesis", "worth"];

static JSON_LD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#)
        .expect("Failed to compile JSON_LD_SELECTOR")
});

static INLINE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]+>").expect("Failed to compile INLINE_TAG_RE")
});

/// Result of the JSON-LD pass.
#[derive(Debug, Default)]
pub struct StructuredFacts {
    pub facts: FactSheet,
    /// `WebPage.dateModified`; scratch only, never part of the fact sheet.
    pub date_modified: Option<String>,
}

impl StructuredFacts {
    pub fn date_modified_parsed(&self) -> Option<DateTime<FixedOffset>> {
        self.date_modified
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
    }
}

/// Reads every JSON-LD block of the page and keeps what the declared types carry.
pub fn extract_structured(page: &NormalizedPage) -> StructuredFacts {
    let mut out = StructuredFacts::default();
    for item in json_ld_items(page) {
        apply_item(&item, &mut out);
    }
    out
}

/// Parses JSON-LD blocks in document order. Arrays and `@graph` containers are flattened.
fn json_ld_items(page: &NormalizedPage) -> Vec<Value> {
    let mut items = Vec::new();
    for (index, script) in page.document.select(&JSON_LD_SELECTOR).enumerate() {
        let raw = script.text().collect::<String>();
        let value: Value = match serde_json::from_str(raw.trim()) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Skipping malformed JSON-LD block #{}: {}", index, e);
                continue;
            }
        };
        match value {
            Value::Array(list) => items.extend(list),
            Value::Object(mut map) => match map.remove("@graph") {
                Some(Value::Array(graph)) => items.extend(graph),
                Some(other) => {
                    map.insert("@graph".to_string(), other);
                    items.push(Value::Object(map));
                }
                None => items.push(Value::Object(map)),
            },
            _ => {}
        }
    }
    tracing::debug!("Found {} JSON-LD items", items.len());
    items
}

fn apply_item(item: &Value, out: &mut StructuredFacts) {
    let Some(map) = item.as_object() else {
        return;
    };

    if has_type(map, "Corporation") {
        let description = map.get("description").and_then(Value::as_str).unwrap_or_default();
        if description.chars().count() > MIN_DESCRIPTION_CHARS {
            tracing::debug!("Using Corporation description as analysis summary");
            out.facts.analysis_summary = Some(strip_inline_tags(description));
        }
    }

    if has_type(map, "FAQPage") {
        for entity in main_entities(map) {
            let question = entity
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase();
            if !THESIS_QUESTION_KEYWORDS.iter().any(|kw| question.contains(kw)) {
                continue;
            }
            let answer = entity
                .get("acceptedAnswer")
                .and_then(|accepted| accepted.get("text"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            if out.facts.offer_summary(strip_inline_tags(answer)) {
                tracing::debug!("FAQ answer for '{}' is the longest summary so far", question);
            }
        }
    }

    if has_type(map, "WebPage") {
        out.date_modified = map.get("dateModified").and_then(Value::as_str).map(str::to_string);
    }
}

/// `@type` may be a single string or a list of strings.
fn has_type(map: &Map<String, Value>, wanted: &str) -> bool {
    match map.get("@type") {
        Some(Value::String(declared)) => declared == wanted,
        Some(Value::Array(declared)) => declared.iter().any(|t| t.as_str() == Some(wanted)),
        _ => false,
    }
}

fn main_entities(map: &Map<String, Value>) -> Vec<&Value> {
    match map.get("mainEntity") {
        Some(Value::Array(entities)) => entities.iter().collect(),
        Some(entity @ Value::Object(_)) => vec![entity],
        _ => Vec::new(),
    }
}

fn strip_inline_tags(text: &str) -> String {
    INLINE_TAG_RE.replace_all(text, "").trim().to_string()
}
