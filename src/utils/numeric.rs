// src/utils/numeric.rs
//! Free-text number parsing: dollar amounts with magnitude words, percentages,
//! and the sanitizer applied to every extracted value.

use once_cell::sync::Lazy;
use regex::Regex;

// Optional "$", a numeric literal, then an optional magnitude word or letter.
// The trailing \b keeps "$12 to" or "$5 months" from reading as T/M suffixes.
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$?([\d,.]+)\s*(trillion|billion|million|thousand|T|B|M|K)?\b")
        .expect("Failed to compile AMOUNT_RE")
});

static PERCENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(-?[\d,.]+)\s*%").expect("Failed to compile PERCENT_RE")
});

// Placeholders the site uses for "no data"
const NO_DATA_TOKENS: [&str; 5] = ["-", "N/A", "n/a", "—", ""];

/// Multiplier for a magnitude suffix. Unknown or missing suffixes scale by 1.
fn magnitude(suffix: &str) -> f64 {
    match suffix.to_ascii_lowercase().as_str() {
        "trillion" | "t" => 1e12,
        "billion" | "b" => 1e9,
        "million" | "m" => 1e6,
        "thousand" | "k" => 1e3,
        _ => 1.0,
    }
}

/// Passes finite numbers through; NaN and infinities become `None`.
pub fn safe_number(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Parses a loosely formatted number ("1,234.5", "$12", "23.8%").
/// Placeholders such as "N/A" or "—" mean no data.
pub fn safe_float(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%'))
        .collect();
    let cleaned = cleaned.trim();
    if NO_DATA_TOKENS.contains(&cleaned) {
        return None;
    }
    cleaned.parse::<f64>().ok().and_then(safe_number)
}

/// Scales an already captured numeric literal by its magnitude suffix.
pub fn scale_amount(number: &str, suffix: Option<&str>) -> Option<f64> {
    let value = number.replace(',', "").parse::<f64>().ok()?;
    safe_number(value * magnitude(suffix.unwrap_or_default()))
}

/// Converts "$59.89 billion", "$81.59B", "1,200" and the like to raw units.
pub fn parse_amount(text: &str) -> Option<f64> {
    let caps = AMOUNT_RE.captures(text.trim())?;
    let number = caps.get(1)?.as_str();
    scale_amount(number, caps.get(2).map(|m| m.as_str()))
}

/// Extracts the first signed number directly followed by "%".
pub fn parse_percent(text: &str) -> Option<f64> {
    let caps = PERCENT_RE.captures(text)?;
    let number = caps.get(1)?.as_str().replace(',', "");
    number.parse::<f64>().ok().and_then(safe_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let value = actual.unwrap_or_else(|| panic!("expected {expected}, got None"));
        assert!((value - expected).abs() < 1e-6 * expected.abs().max(1.0), "expected {expected}, got {value}");
    }

    #[test]
    fn test_parse_amount_magnitudes() {
        assert_close(parse_amount("$59.89 billion"), 59.89e9);
        assert_close(parse_amount("$81.59B"), 81.59e9);
        assert_close(parse_amount("$1.2 trillion"), 1.2e12);
        assert_close(parse_amount("$450 Million"), 450e6);
        assert_close(parse_amount("$12K"), 12e3);
        assert_close(parse_amount("$1,234"), 1234.0);
    }

    #[test]
    fn test_parse_amount_no_data() {
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("$..."), None);
    }

    #[test]
    fn test_parse_amount_ignores_words_starting_with_suffix_letters() {
        // "to" must not be read as a trillion suffix
        assert_close(parse_amount("$12 to $14"), 12.0);
    }

    #[test]
    fn test_parse_percent() {
        assert_close(parse_percent("23.8%"), 23.8);
        assert_close(parse_percent("margin fell to -4.5 %"), -4.5);
        assert_eq!(parse_percent("no data"), None);
    }

    #[test]
    fn test_safe_number_rejects_non_finite() {
        assert_eq!(safe_number(f64::NAN), None);
        assert_eq!(safe_number(f64::INFINITY), None);
        assert_eq!(safe_number(f64::NEG_INFINITY), None);
        assert_eq!(safe_number(0.0), Some(0.0));
    }

    #[test]
    fn test_safe_float_placeholders() {
        assert_eq!(safe_float("N/A"), None);
        assert_eq!(safe_float("—"), None);
        assert_eq!(safe_float(" - "), None);
        assert_eq!(safe_float("abc"), None);
        assert_eq!(safe_float("NaN"), None);
        assert_close(safe_float("$1,234.50"), 1234.5);
        assert_close(safe_float("12%"), 12.0);
    }
}
