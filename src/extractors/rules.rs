// src/extractors/rules.rs
//! Declarative field rules for the heuristic pass.
//!
//! Each rule targets one or more fields and carries an ordered list of
//! patterns. Patterns are tried in order and the first one that matches and
//! yields a usable value wins. Table order matters where rules share a field:
//! a miss rule sits after its beat rule and only fills a field the beat rule
//! left empty.

use crate::extractors::fact_sheet::{Label, Metric};
use crate::utils::numeric::{safe_float, scale_amount};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// How a pattern's captures become a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Group 1 is a plain number or percentage.
    Number,
    /// Group 1 is a number, group 2 a magnitude word.
    Amount,
    /// Group 1 is a per-share price; a magnitude in group 2 disqualifies it.
    PerShare,
}

impl Capture {
    fn value(self, caps: &Captures) -> Option<f64> {
        let number = caps.get(1)?.as_str();
        match self {
            Capture::Number => safe_float(number),
            Capture::Amount => scale_amount(number, caps.get(2).map(|m| m.as_str())),
            Capture::PerShare => match caps.get(2) {
                Some(_) => None,
                None => safe_float(number),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    Overwrite,
    /// Skip the rule when any target already holds a value.
    FillIfAbsent,
}

pub struct MetricRule {
    pub targets: &'static [Metric],
    pub capture: Capture,
    pub sign: Sign,
    pub write: WritePolicy,
    pub patterns: Vec<Regex>,
}

impl MetricRule {
    fn new(targets: &'static [Metric], capture: Capture, patterns: &[&str]) -> Self {
        Self {
            targets,
            capture,
            sign: Sign::Positive,
            write: WritePolicy::Overwrite,
            patterns: compile(patterns),
        }
    }

    /// Miss-style rule: negates the value and never overrides an existing one.
    fn miss(mut self) -> Self {
        self.sign = Sign::Negated;
        self.write = WritePolicy::FillIfAbsent;
        self
    }

    /// First usable value across the pattern chain, sign applied.
    pub fn first_match(&self, text: &str) -> Option<f64> {
        let value = self
            .patterns
            .iter()
            .find_map(|re| re.captures(text).and_then(|caps| self.capture.value(&caps)))?;
        Some(match self.sign {
            Sign::Positive => value,
            Sign::Negated => -value,
        })
    }
}

pub struct LabelRule {
    pub label: Label,
    pub lowercase: bool,
    pub patterns: Vec<Regex>,
}

impl LabelRule {
    pub fn first_match(&self, text: &str) -> Option<String> {
        let found = self
            .patterns
            .iter()
            .find_map(|re| re.captures(text).and_then(|caps| caps.get(1)))?
            .as_str()
            .trim();
        Some(if self.lowercase { found.to_lowercase() } else { found.to_string() })
    }
}

pub struct HighlightRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub render: fn(&Captures) -> Option<String>,
}

impl HighlightRule {
    fn new(name: &'static str, pattern: &str, render: fn(&Captures) -> Option<String>) -> Self {
        Self { name, pattern: compile_one(pattern), render }
    }

    pub fn first_match(&self, text: &str) -> Option<String> {
        self.pattern.captures(text).and_then(|caps| (self.render)(&caps))
    }
}

fn compile_one(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("Failed to compile rule pattern '{}': {}", pattern, e))
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|pat| compile_one(pat)).collect()
}

fn group<'h>(caps: &Captures<'h>, index: usize) -> Option<&'h str> {
    caps.get(index).map(|m| m.as_str().trim()).filter(|s| !s.is_empty())
}

// --- Numeric field rules, in evaluation order ---
pub static METRIC_RULES: Lazy<Vec<MetricRule>> = Lazy::new(|| {
    use Capture::*;
    vec![
        MetricRule::new(&[Metric::QuarterlyRevenue], Amount, &[
            r"(?i)revenue[:\s]*\$?([\d,.]+)\s*(trillion|billion|million|T|B|M)\b",
        ]),
        MetricRule::new(&[Metric::RevenueBeatPercent], Number, &[
            r"(?i)(?:revenue|sales).*?(\d+\.?\d*)%\s*(?:analyst\s*)?beat",
            // "beating analysts' estimates by 3.2%"
            r"(?i)beat(?:ing)?\s+.*?(?:estimate|consensus).*?(?:by\s+)?(\d+\.?\d*)%",
        ]),
        MetricRule::new(&[Metric::RevenueBeatPercent], Number, &[
            r"(?i)(?:revenue|sales).*?(\d+\.?\d*)%\s*(?:analyst\s*)?miss",
        ])
        .miss(),
        MetricRule::new(&[Metric::QuarterlyEps], PerShare, &[
            r"(?i)\b(?:EPS|earnings per share)[^$]*\$(\d+\.?\d*)(\s*(?:trillion|billion|million|thousand|[TBMK])\b)?",
        ]),
        MetricRule::new(&[Metric::EpsBeatPercent], Number, &[
            // "$8.88 vs analyst estimates of $8.22 (8% beat)"
            r"(?i)\$[\d.]+\s*vs\.?\s*analyst\s*estimates?\s*of\s*\$[\d.]+\s*\((\d+\.?\d*)%\s*beat\)",
            r"(?i)\bEPS.*?(\d+\.?\d*)%\s*(?:analyst\s*)?beat",
        ]),
        MetricRule::new(&[Metric::EpsBeatPercent], Number, &[
            r"(?i)\$[\d.]+\s*vs\.?\s*analyst\s*estimates?\s*of\s*\$[\d.]+\s*\((\d+\.?\d*)%\s*miss\)",
            r"(?i)\bEPS.*?(\d+\.?\d*)%\s*(?:analyst\s*)?miss",
        ])
        .miss(),
        MetricRule::new(&[Metric::GrossMargin, Metric::QuarterlyGrossMargin], Number, &[
            r"(?i)(\d+\.?\d*)%\s*gross\s*(?:profit\s*)?margin",
            r"(?i)gross\s*(?:profit\s*)?margin[^%]*?(\d+\.?\d*)%",
        ]),
        MetricRule::new(&[Metric::OperatingMargin, Metric::QuarterlyOperatingMargin], Number, &[
            r"(?i)operating\s*margin[^%]*?(\d+\.?\d*)%",
            r"(?i)(\d+\.?\d*)%\s*operating\s*margin",
        ]),
        MetricRule::new(&[Metric::GuidanceRevenue], Amount, &[
            r"(?i)(?:guidance|outlook|forecast)[^$]*\$?([\d,.]+)\s*(trillion|billion|million|T|B|M)\b",
            // "$55 billion at the midpoint"
            r"(?i)\$([\d,.]+)\s*(trillion|billion|million|T|B|M)\b[^.]*(?:midpoint|guidance|outlook)",
        ]),
        MetricRule::new(&[Metric::GuidanceRevenueVsEstimate], Number, &[
            r"(?i)(?:guidance|outlook|midpoint|forecast)[^.]*?(\d+\.?\d*)%\s*(?:above|ahead of|over)\s*(?:consensus|estimate|expectations|analysts)",
            r"(?i)(\d+\.?\d*)%\s*(?:above|ahead of)\s*(?:consensus|estimate|expectations)",
        ]),
        MetricRule::new(&[Metric::GuidanceRevenueVsEstimate], Number, &[
            r"(?i)(?:guidance|outlook|midpoint|forecast)[^.]*?(\d+\.?\d*)%\s*(?:below|behind|under)\s*(?:consensus|estimate|expectations|analysts)",
        ])
        .miss(),
        // Five-year window first; three-year lands in the same field when absent
        MetricRule::new(&[Metric::RevenueCagr5y], Number, &[
            r"(?i)(\d+\.?\d*)%\s*(?:annualized\s*)?revenue\s*growth.*?(?:five|5)[\s-]*year",
            r"(?i)(\d+\.?\d*)%\s*(?:annualized\s*)?revenue\s*growth.*?(?:three|3)[\s-]*year",
        ]),
        MetricRule::new(&[Metric::RevenueCagr2y], Number, &[
            r"(?i)(\d+\.?\d*)%\s*(?:annualized\s*)?revenue\s*growth.*?(?:two|2)[\s-]*year",
        ]),
        // EPS wording must share the clause, otherwise ARPU-style growth leaks in
        MetricRule::new(&[Metric::EpsCagr5y], Number, &[
            r"(?i)\b(?:EPS|earnings\s*per\s*share)[^.]*?(\d+\.?\d*)%\s*(?:compounded\s*)?(?:annual\s*)?(?:growth|CAGR)",
            r"(?i)\b(?:EPS|earnings\s*per\s*share)[^.]*?\bgrew\b[^.]*?(\d+\.?\d*)%",
        ]),
        MetricRule::new(&[Metric::Cash], Amount, &[
            r"(?i)\$([\d,.]+)\s*(trillion|billion|million|T|B|M)\b\s*(?:of\s*)?(?:in\s*)?cash",
        ]),
        MetricRule::new(&[Metric::Debt], Amount, &[
            r"(?i)\$([\d,.]+)\s*(trillion|billion|million|T|B|M)\b\s*(?:of\s*)?(?:in\s*)?debt",
        ]),
        MetricRule::new(&[Metric::NetDebtToEbitda], Number, &[
            r"(?i)net\s*debt.*?(\d+\.?\d*)x?\s*(?:times?\s*)?EBITDA",
        ]),
        MetricRule::new(&[Metric::Roic], Number, &[
            r"(?i)\b(?:ROIC|return on invested capital)[^%]*?(\d+\.?\d*)%",
        ]),
    ]
});

// --- Short text field rules ---
pub static LABEL_RULES: Lazy<Vec<LabelRule>> = Lazy::new(|| {
    vec![
        LabelRule {
            label: Label::LatestQuarter,
            lowercase: false,
            patterns: compile(&[r"(Q[1-4]\s+(?:FY|CY)\s*20\d{2})"]),
        },
        LabelRule {
            label: Label::GrossMarginTrend,
            lowercase: true,
            patterns: compile(&[
                r"(?i)gross.*?margin.*?\b(expanding|contracting|stable|improving|declining)\b",
            ]),
        },
        LabelRule {
            label: Label::OperatingMarginTrend,
            lowercase: true,
            patterns: compile(&[
                // "operating margin of 41.3%, down from 43.5%"
                r"(?i)operating\s*margin.*?\b(down|up)\s*from\s*\d+\.?\d*%",
                r"(?i)operating\s*margin.*?\b(expanding|contracting|stable|improving|declining)\b",
            ]),
        },
    ]
});

// --- Key highlight rules, appended in this order ---
pub static HIGHLIGHT_RULES: Lazy<Vec<HighlightRule>> = Lazy::new(|| {
    vec![
        HighlightRule::new(
            "investment_stance",
            r"(?i)(We(?:['’]d|['’]re|\s+would)\s+(?:invest|not invest|pass|buy|sell)[^.]*\.(?:[^.]*\.)?)",
            |caps| group(caps, 1).map(str::to_string),
        ),
        HighlightRule::new(
            "ebitda_margin",
            r"(?i)(\d+\.?\d*)%\s*(?:adjusted\s*)?EBITDA\s*margin",
            |caps| group(caps, 1).map(|v| format!("EBITDA Margin: {}%", v)),
        ),
        HighlightRule::new(
            "revenue_yoy_growth",
            r"(?i)(\d+\.?\d*)%\s*(?:year[- ]on[- ]year|YoY|year\s*over\s*year)",
            |caps| group(caps, 1).map(|v| format!("Revenue YoY Growth: {}%", v)),
        ),
        HighlightRule::new(
            "share_count_reduction",
            r"(?i)(?:share|stock)\s*(?:count|repurchase|buyback).*?(\d+\.?\d*)%\s*(?:annually|reduction|decrease)",
            |caps| group(caps, 1).map(|v| format!("Share Count Reduction: {}% annually", v)),
        ),
        HighlightRule::new(
            "forward_ev_ebitda",
            r"(?i)(\d+\.?\d*)x?\s*(?:forward\s*)?EV/?EBITDA",
            |caps| group(caps, 1).map(|v| format!("Forward EV/EBITDA: {}x", v)),
        ),
        HighlightRule::new(
            "analyst_price_target",
            // Decimal part is optional so a sentence-ending period is not captured
            r"(?i)(?:analyst|consensus|average)\s*(?:price\s*)?target[:\s]*\$(\d[\d,]*(?:\.\d+)?)",
            |caps| group(caps, 1).map(|v| format!("Analyst Price Target: ${}", v)),
        ),
        HighlightRule::new(
            "market_cap",
            r"(?i)market\s*cap[:\s]*\$?([\d,.]+)\s*(trillion|billion|million|T|B|M)\b",
            |caps| {
                let value = group(caps, 1)?;
                let unit = group(caps, 2)?;
                Some(format!("Market Cap: ${} {}", value, unit))
            },
        ),
    ]
});
