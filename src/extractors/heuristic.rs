// src/extractors/heuristic.rs

use crate::extractors::fact_sheet::FactSheet;
use crate::extractors::normalize::NormalizedPage;
use crate::extractors::rules::{MetricRule, WritePolicy, HIGHLIGHT_RULES, LABEL_RULES, METRIC_RULES};
use once_cell::sync::Lazy;
use regex::Regex;

// --- Rating vocabulary (first listed badge present wins) ---
const QUALITY_BADGES: [&str; 3] = ["High Quality", "Average Quality", "Low Quality"];
const VALUE_BADGES: [&str; 6] = [
    "Timely Buy",
    "Fair Value",
    "Overvalued",
    "Outperform",
    "Underperform",
    "Market Perform",
];
const RATING_SEPARATOR: &str = " / ";

// --- Chart image scanning (raw HTML, so <noscript> fallbacks count too) ---
// Chart renders live under a chart-images path; logos and avatars do not.
// `[^>]*src=` also matches `data-src` on an <img>, in document order.
static IMG_CHART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img[^>]*src="(https?://[^"]*chart-images[^"]*\.png)""#)
        .expect("Failed to compile IMG_CHART_RE")
});

static DATA_SRC_CHART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)data-src="(https?://[^"]*chart-images[^"]*\.png)""#)
        .expect("Failed to compile DATA_SRC_CHART_RE")
});

/// Runs every text rule over the page. Never fails: a rule that does not
/// match leaves its field empty.
pub fn extract_heuristic(page: &NormalizedPage) -> FactSheet {
    let mut facts = FactSheet::new();

    facts.investment_rating = extract_rating(page.rating_window());

    for rule in LABEL_RULES.iter() {
        if let Some(value) = rule.first_match(&page.text) {
            tracing::debug!("{} = {:?}", rule.label.name(), value);
            *facts.label_mut(rule.label) = Some(value);
        }
    }

    for rule in METRIC_RULES.iter() {
        apply_metric_rule(rule, &page.text, &mut facts);
    }

    for rule in HIGHLIGHT_RULES.iter() {
        if let Some(highlight) = rule.first_match(&page.text) {
            if facts.push_highlight(highlight) {
                tracing::debug!("Added {} highlight", rule.name);
            }
        }
    }

    collect_chart_urls(page.raw_html, &mut facts);

    facts
}

fn apply_metric_rule(rule: &MetricRule, text: &str, facts: &mut FactSheet) {
    if rule.write == WritePolicy::FillIfAbsent
        && rule.targets.iter().any(|metric| facts.metric(*metric).is_some())
    {
        return;
    }
    let Some(value) = rule.first_match(text) else {
        return;
    };
    for metric in rule.targets {
        tracing::debug!("{} = {}", metric.name(), value);
        *facts.metric_mut(*metric) = Some(value);
    }
}

/// "<quality> / <value>" from whichever badges appear in `window`.
pub fn extract_rating(window: &str) -> Option<String> {
    let parts: Vec<&str> = [
        QUALITY_BADGES.iter().find(|badge| window.contains(**badge)),
        VALUE_BADGES.iter().find(|badge| window.contains(**badge)),
    ]
    .into_iter()
    .flatten()
    .copied()
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(RATING_SEPARATOR))
    }
}

/// Chart images from `<img>` tags first, then any other `data-src` (lazy-loaded images).
fn collect_chart_urls(raw_html: &str, facts: &mut FactSheet) {
    let sources = IMG_CHART_RE
        .captures_iter(raw_html)
        .chain(DATA_SRC_CHART_RE.captures_iter(raw_html))
        .filter_map(|caps| caps.get(1));

    for url in sources {
        let url = url.as_str();
        if facts.push_chart_url(url) {
            tracing::debug!("Found chart image: {}", url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heuristic(html: &str) -> FactSheet {
        extract_heuristic(&NormalizedPage::parse(html))
    }

    fn filler(words: usize) -> String {
        "Lorem ipsum dolor sit amet. ".repeat(words)
    }

    #[test]
    fn test_rating_from_top_of_page() {
        let html = format!("<p>META: High Quality, Timely Buy</p><p>{}</p>", filler(20));
        assert_eq!(heuristic(&html).investment_rating.as_deref(), Some("High Quality / Timely Buy"));
    }

    #[test]
    fn test_rating_with_single_badge() {
        let html = format!("<p>Rated Underperform</p><p>{}</p>", filler(20));
        assert_eq!(heuristic(&html).investment_rating.as_deref(), Some("Underperform"));
    }

    #[test]
    fn test_rating_ignores_related_stocks_section() {
        let html = format!(
            "<p>{}</p><section>Related stocks: AAPL High Quality, Timely Buy</section>",
            filler(20)
        );
        assert_eq!(heuristic(&html).investment_rating, None);
    }

    #[test]
    fn test_revenue_beat_is_not_overwritten_by_later_miss() {
        let text = "<p>Revenue grew with a 12% analyst beat. Sales last year had a 3% analyst miss.</p>";
        assert_eq!(heuristic(text).revenue_beat_percent, Some(12.0));
    }

    #[test]
    fn test_revenue_beat_fallback_phrase() {
        let text = "<p>The company reported a solid quarter, beating analysts' consensus estimates by 3.2%.</p>";
        assert_eq!(heuristic(text).revenue_beat_percent, Some(3.2));
    }

    #[test]
    fn test_eps_miss_without_beat_is_negative() {
        let text = "<p>EPS of $1.20 came in with a 9% analyst miss.</p>";
        let facts = heuristic(text);
        assert_eq!(facts.eps_beat_percent, Some(-9.0));
        assert_eq!(facts.quarterly_eps, Some(1.2));
        assert_eq!(facts.revenue_beat_percent, None);
    }

    #[test]
    fn test_margins_both_word_orders_and_trends() {
        let text = "<p>Gross margin was 81.8% and gross margins are expanding. \
                    Operating margin of 41.3%, down from 43.5% last year.</p>";
        let facts = heuristic(text);
        assert_eq!(facts.gross_margin, Some(81.8));
        assert_eq!(facts.quarterly_gross_margin, Some(81.8));
        assert_eq!(facts.operating_margin, Some(41.3));
        assert_eq!(facts.quarterly_operating_margin, Some(41.3));
        assert_eq!(facts.gross_margin_trend.as_deref(), Some("expanding"));
        assert_eq!(facts.operating_margin_trend.as_deref(), Some("down"));
    }

    #[test]
    fn test_guidance_amount_and_signed_vs_estimate() {
        let above = heuristic("<p>Guidance for next quarter is $55 billion at the midpoint, 2.4% above analysts' estimates</p>");
        assert_eq!(above.guidance_revenue, Some(55e9));
        assert_eq!(above.guidance_revenue_vs_estimate, Some(2.4));

        let below = heuristic("<p>Next quarter's outlook implies a 3% below consensus number</p>");
        assert_eq!(below.guidance_revenue_vs_estimate, Some(-3.0));
    }

    #[test]
    fn test_guidance_amount_before_keyword() {
        let facts = heuristic("<p>Management expects $12.5B in sales, the midpoint of its range</p>");
        assert_eq!(facts.guidance_revenue, Some(12.5e9));
    }

    #[test]
    fn test_revenue_cagr_prefers_five_year_and_falls_back_to_three() {
        let five = heuristic("<p>It posted 21.4% annualized revenue growth over the last five years and 19.9% annualized revenue growth over the last three years.</p>");
        assert_eq!(five.revenue_cagr_5y, Some(21.4));

        let three = heuristic("<p>It posted 19.9% annualized revenue growth over the last three years.</p>");
        assert_eq!(three.revenue_cagr_5y, Some(19.9));

        let two = heuristic("<p>It posted 22% annualized revenue growth over the last two years.</p>");
        assert_eq!(two.revenue_cagr_2y, Some(22.0));
        assert_eq!(two.revenue_cagr_5y, None);
    }

    #[test]
    fn test_eps_cagr_requires_eps_wording() {
        let facts = heuristic("<p>Average revenue per user saw 12% compounded annual growth.</p>");
        assert_eq!(facts.eps_cagr_5y, None);

        let facts = heuristic("<p>Its EPS posted 27.3% compounded annual growth over the last five years.</p>");
        assert_eq!(facts.eps_cagr_5y, Some(27.3));

        let facts = heuristic("<p>Earnings per share grew at a 15% clip.</p>");
        assert_eq!(facts.eps_cagr_5y, Some(15.0));
    }

    #[test]
    fn test_balance_sheet_fields() {
        let text = "<p>The company holds $58.1 billion of cash and $28.8 billion of debt. \
                    Its net debt position is 0.2x EBITDA. ROIC averaged 24.5% over five years.</p>";
        let facts = heuristic(text);
        assert_eq!(facts.cash, Some(58.1e9));
        assert_eq!(facts.debt, Some(28.8e9));
        assert_eq!(facts.net_debt_to_ebitda, Some(0.2));
        assert_eq!(facts.roic, Some(24.5));
    }

    #[test]
    fn test_key_highlights_are_unique_and_ordered() {
        let text = "<p>We'd invest in this one. The platform is dominant. \
                    Its 52.1% EBITDA margin is strong, and again the 52.1% EBITDA margin stands out. \
                    Revenue rose 22% year on year. \
                    Trading at 14.2x forward EV/EBITDA with an analyst price target: $745.50. \
                    Market cap: $1.79 trillion.</p>";
        let facts = heuristic(text);
        assert_eq!(
            facts.key_highlights,
            vec![
                "We'd invest in this one. The platform is dominant.",
                "EBITDA Margin: 52.1%",
                "Revenue YoY Growth: 22%",
                "Forward EV/EBITDA: 14.2x",
                "Analyst Price Target: $745.50",
                "Market Cap: $1.79 trillion",
            ]
        );
    }

    #[test]
    fn test_chart_urls_deduplicated_across_src_and_data_src() {
        let html = r#"<body>
            <img src="https://cdn.stockstory.org/logos/meta.png">
            <img src="https://cdn.stockstory.org/chart-images/meta-revenue.png">
            <img data-src="https://cdn.stockstory.org/chart-images/meta-revenue.png">
            <div data-src="https://cdn.stockstory.org/chart-images/meta-margin.png"></div>
            <img src="https://cdn.stockstory.org/chart-images/meta-eps.svg">
        </body>"#;
        let facts = heuristic(html);
        assert_eq!(
            facts.chart_urls,
            vec![
                "https://cdn.stockstory.org/chart-images/meta-revenue.png",
                "https://cdn.stockstory.org/chart-images/meta-margin.png",
            ]
        );
    }

    #[test]
    fn test_chart_urls_in_img_document_order_and_noscript() {
        let html = r#"<body>
            <img data-src="https://x/chart-images/a.png" src="data:image/gif;base64,R0lGOD">
            <img src="https://x/chart-images/b.png">
            <noscript><img src="https://x/chart-images/c.png"></noscript>
        </body>"#;
        assert_eq!(
            heuristic(html).chart_urls,
            vec![
                "https://x/chart-images/a.png",
                "https://x/chart-images/b.png",
                "https://x/chart-images/c.png",
            ]
        );
    }

    #[test]
    fn test_noscript_markup_does_not_feed_rules() {
        let html = r#"<p>Nothing here.</p><noscript><img alt="Revenue: $5 billion" src="https://x/chart-images/r.png"></noscript>"#;
        let facts = heuristic(html);
        assert_eq!(facts.quarterly_revenue, None);
        assert_eq!(facts.chart_urls, vec!["https://x/chart-images/r.png"]);
    }

    #[test]
    fn test_curly_apostrophe_stance_and_share_count_highlight() {
        let text = "<p>We’d invest in this one. The platform is dominant. \
                    Its share count shrank by 4.1% annually.</p>";
        assert_eq!(
            heuristic(text).key_highlights,
            vec![
                "We’d invest in this one. The platform is dominant.",
                "Share Count Reduction: 4.1% annually",
            ]
        );
    }

    #[test]
    fn test_empty_page_yields_empty_sheet() {
        assert_eq!(heuristic(""), FactSheet::new());
    }
}
